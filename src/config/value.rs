// src/config/value.rs

//! Read-side coercion of raw INI strings into typed values.
//!
//! Coercion is one-directional: writes store the caller's literal text, and
//! every read runs [`coerce`] again on whatever is on disk.

use std::fmt;

use serde::Serialize;

use crate::errors::{Result, UtilError};

/// A coerced configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing key, bare key, or empty value.
    Absent,
    Int(i64),
    Str(String),
    /// Comma-separated value, in source order.
    List(Vec<Item>),
}

/// One element of a comma-separated [`Value::List`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Item {
    Int(i64),
    Str(String),
}

impl Value {
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Item]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => Ok(()),
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Int(n) => write!(f, "{n}"),
            Item::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<Vec<Item>> for Value {
    fn from(items: Vec<Item>) -> Self {
        Value::List(items)
    }
}

impl From<i64> for Item {
    fn from(n: i64) -> Self {
        Item::Int(n)
    }
}

impl From<&str> for Item {
    fn from(s: &str) -> Self {
        Item::Str(s.to_string())
    }
}

/// Coerce a raw value (`None` for a bare key) into a [`Value`].
///
/// Rules, in order:
/// - every double quote is removed, so quoted list items unwrap too;
/// - a value containing a comma becomes a list, each part trimmed, digit-only
///   parts parsed as integers (order preserved, never sorted);
/// - a digit-only value becomes an integer;
/// - an empty value becomes [`Value::Absent`];
/// - anything else is a trimmed string.
///
/// Digit strings that do not fit in `i64` are an error.
pub fn coerce(raw: Option<&str>) -> Result<Value> {
    let Some(raw) = raw else {
        return Ok(Value::Absent);
    };
    let unquoted = raw.replace('"', "");
    let text = unquoted.trim();

    if text.contains(',') {
        let items = text
            .split(',')
            .map(|part| coerce_item(part.trim()))
            .collect::<Result<Vec<_>>>()?;
        return Ok(Value::List(items));
    }

    if text.is_empty() {
        Ok(Value::Absent)
    } else if is_digits(text) {
        parse_int(text).map(Value::Int)
    } else {
        Ok(Value::Str(text.to_string()))
    }
}

fn coerce_item(part: &str) -> Result<Item> {
    if is_digits(part) {
        parse_int(part).map(Item::Int)
    } else {
        Ok(Item::Str(part.to_string()))
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_int(s: &str) -> Result<i64> {
    s.parse::<i64>().map_err(|e| UtilError::InvalidValue {
        raw: s.to_string(),
        reason: e.to_string(),
    })
}
