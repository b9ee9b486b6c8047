// src/misc.rs

//! Date formatting, git branch lookup and interactive prompts.

use std::io::{self, BufRead, Write};
use std::path::Path;

use chrono::{NaiveDateTime, Utc};
use tracing::debug;

use crate::errors::{Result, UtilError};
use crate::fs::{FileSystem, RealFileSystem};

/// `Thu Jan 01 2024 10:00:00`-style layout (`%a %b %m %Y %X`).
pub const DATE_TIME_FORMAT_LONG: &str = "%a %b %m %Y %X";
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S%.6f";

const HEAD_REF_PREFIX: &str = "ref:";
const HEADS_PREFIX: &str = "refs/heads/";

fn short_format() -> String {
    format!("{DATE_FORMAT} {TIME_FORMAT}")
}

/// Current UTC time in [`DATE_TIME_FORMAT_LONG`].
pub fn current_date_time_str_long() -> String {
    Utc::now().format(DATE_TIME_FORMAT_LONG).to_string()
}

/// `2024-01-01 00:00:00.000000`
pub fn datetime_to_str_short(dt: &NaiveDateTime) -> String {
    dt.format(&short_format()).to_string()
}

/// Inverse of [`datetime_to_str_short`].
pub fn str_to_datetime_short(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), &format!("{DATE_FORMAT} %H:%M:%S%.f")).map_err(|e| {
        UtilError::InvalidValue {
            raw: s.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Branch checked out in the repository at `root`, or `default` when it
/// cannot be determined (no `.git/HEAD`, detached head).
pub fn active_branch_name(root: impl AsRef<Path>, default: &str) -> String {
    let head = root.as_ref().join(".git").join("HEAD");
    let contents = match RealFileSystem.read_to_string(&head) {
        Ok(contents) => contents,
        Err(e) => {
            debug!(?head, error = %e, "no git HEAD, using default branch");
            return default.to_string();
        }
    };
    contents
        .lines()
        .filter(|line| line.starts_with(HEAD_REF_PREFIX))
        .find_map(|line| line.split_once(HEADS_PREFIX).map(|(_, b)| b.trim().to_string()))
        .filter(|branch| !branch.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Ask a yes/no question until a recognizable answer arrives.
///
/// An empty answer or end of input picks `default`.
pub fn prompt_yes_no<R, W>(input: &mut R, output: &mut W, question: &str, default: bool) -> io::Result<bool>
where
    R: BufRead,
    W: Write,
{
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    loop {
        write!(output, "{question} {hint}: ")?;
        output.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            return Ok(default);
        }
        match answer.trim().to_lowercase().as_str() {
            "" => return Ok(default),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(output, "Please answer 'y' or 'n'.")?,
        }
    }
}
