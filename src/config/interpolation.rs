// src/config/interpolation.rs

//! `${...}` reference expansion.
//!
//! - `${key}` resolves in the same section (falling back to `DEFAULT`).
//! - `${section:key}` resolves in another section.
//! - `$$` is a literal `$`.
//!
//! Referenced values are expanded recursively up to [`MAX_DEPTH`] levels.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::document::IniDocument;
use crate::errors::{Result, UtilError};

pub const MAX_DEPTH: usize = 10;

static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$\{([^}]+)\}").expect("static regex"));

static ANY_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{[^}]+\}").expect("static regex"));

/// Expand all references in `raw`, read from `section`.
pub fn expand(doc: &IniDocument, section: &str, raw: &str) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    expand_into(doc, section, raw, 1, &mut out)?;
    Ok(out)
}

fn expand_into(
    doc: &IniDocument,
    section: &str,
    raw: &str,
    depth: usize,
    out: &mut String,
) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(UtilError::Interpolation(format!(
            "recursion limit exceeded in section {section:?}: {raw:?}"
        )));
    }

    let mut rest = raw;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        if let Some(after) = rest.strip_prefix("$$") {
            out.push('$');
            rest = after;
            continue;
        }

        let Some(caps) = REFERENCE.captures(rest) else {
            return Err(UtilError::Interpolation(format!(
                "'$' must be followed by '$' or '{{', found: {rest:?}"
            )));
        };
        let whole = caps.get(0).map_or(0, |m| m.end());
        let path = caps.get(1).map_or("", |m| m.as_str());
        rest = &rest[whole..];

        let (target_section, key) = match path.split(':').collect::<Vec<_>>().as_slice() {
            [key] => (section, *key),
            [sect, key] => (*sect, *key),
            _ => {
                return Err(UtilError::Interpolation(format!(
                    "more than one ':' found in reference ${{{path}}}"
                )));
            }
        };

        let value = doc.get_raw(target_section, key).map_err(|e| {
            UtilError::Interpolation(format!(
                "bad reference ${{{path}}} in section {section:?}: {e}"
            ))
        })?;
        let value = value.unwrap_or("");
        if value.contains('$') {
            expand_into(doc, target_section, value, depth + 1, out)?;
        } else {
            out.push_str(value);
        }
    }
    out.push_str(rest);
    Ok(())
}

/// Reject values whose `$` usage could never expand.
pub fn check_syntax(value: &str) -> Result<()> {
    let stripped = value.replace("$$", "");
    let stripped = ANY_REFERENCE.replace_all(&stripped, "");
    if stripped.contains('$') {
        return Err(UtilError::Interpolation(format!(
            "invalid interpolation syntax in {value:?}"
        )));
    }
    Ok(())
}
