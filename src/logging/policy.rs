// src/logging/policy.rs

//! Rotation policy model and its TOML loader.
//!
//! ```toml
//! directory = "./logs"
//! filename = "app.log"
//! retention_days = 7
//! level = "debug"
//!
//! [trigger]
//! kind = "time"
//! when = "midnight"
//! utc = true
//! ```
//!
//! or, for size-based rotation:
//!
//! ```toml
//! [trigger]
//! kind = "size"
//! max_bytes = 5242880
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer};

use crate::errors::{Result, UtilError};
use crate::logging::Severity;
use crate::logging::rotator::report;

pub const DEFAULT_DIRECTORY: &str = "./logs";
pub const DEFAULT_FILENAME: &str = "app.log";
pub const DEFAULT_ENCODING: &str = "UTF-8";
pub const DEFAULT_RETENTION_DAYS: u32 = 7;
pub const DEFAULT_MAX_MBYTES: u64 = 5;

/// Wall-clock boundary for time-based rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum When {
    Seconds,
    Minutes,
    Hours,
    Days,
    #[default]
    Midnight,
    /// 0 = Monday … 6 = Sunday.
    Weekday(u8),
}

impl When {
    /// Length of one rotation period before the interval multiplier.
    pub fn base_secs(&self) -> i64 {
        match self {
            When::Seconds => 1,
            When::Minutes => 60,
            When::Hours => 60 * 60,
            When::Days | When::Midnight => 24 * 60 * 60,
            When::Weekday(_) => 7 * 24 * 60 * 60,
        }
    }

    /// `strftime` pattern of the archive suffix.
    pub fn suffix_format(&self) -> &'static str {
        match self {
            When::Seconds => "%Y%m%d%H%M%S",
            When::Minutes => "%Y%m%d%H%M",
            When::Hours => "%Y%m%d%H",
            When::Days | When::Midnight | When::Weekday(_) => "%Y%m%d",
        }
    }
}

impl FromStr for When {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "S" => Ok(When::Seconds),
            "M" => Ok(When::Minutes),
            "H" => Ok(When::Hours),
            "D" => Ok(When::Days),
            "MIDNIGHT" => Ok(When::Midnight),
            w if w.len() == 2 && w.starts_with('W') => match w[1..].parse::<u8>() {
                Ok(day) if day <= 6 => Ok(When::Weekday(day)),
                _ => Err(format!("invalid weekday rollover {s:?} (expected W0-W6)")),
            },
            _ => Err(format!(
                "invalid rollover {s:?} (expected S, M, H, D, midnight or W0-W6)"
            )),
        }
    }
}

impl TryFrom<String> for When {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for When {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            When::Seconds => write!(f, "S"),
            When::Minutes => write!(f, "M"),
            When::Hours => write!(f, "H"),
            When::Days => write!(f, "D"),
            When::Midnight => write!(f, "midnight"),
            When::Weekday(d) => write!(f, "W{d}"),
        }
    }
}

/// What makes the active log file roll over.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RotationTrigger {
    Time {
        #[serde(default)]
        when: When,
        #[serde(default = "default_interval")]
        interval: u32,
        /// Time of day for `midnight` and weekday rolls.
        #[serde(default)]
        at_time: Option<NaiveTime>,
        #[serde(default = "default_utc")]
        utc: bool,
    },
    Size {
        /// `0` disables rotation.
        max_bytes: u64,
    },
}

fn default_interval() -> u32 {
    1
}

fn default_utc() -> bool {
    true
}

impl Default for RotationTrigger {
    fn default() -> Self {
        RotationTrigger::Time {
            when: When::Midnight,
            interval: default_interval(),
            at_time: None,
            utc: default_utc(),
        }
    }
}

impl RotationTrigger {
    pub fn time(when: When) -> Self {
        RotationTrigger::Time {
            when,
            interval: 1,
            at_time: None,
            utc: true,
        }
    }

    pub fn size_mbytes(max_mbytes: u64) -> Self {
        RotationTrigger::Size {
            max_bytes: max_mbytes * 1024 * 1024,
        }
    }
}

/// Everything needed to set up a rotating log.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogPolicy {
    pub directory: PathBuf,
    pub filename: String,
    pub encoding: String,
    pub retention_days: u32,
    /// Overridden by a valid `DDCUTILS_LOG` environment variable; `None` means `info`.
    #[serde(deserialize_with = "lenient_severity")]
    pub level: Option<Severity>,
    pub trigger: RotationTrigger,
}

impl Default for LogPolicy {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_DIRECTORY),
            filename: DEFAULT_FILENAME.to_string(),
            encoding: DEFAULT_ENCODING.to_string(),
            retention_days: DEFAULT_RETENTION_DAYS,
            level: None,
            trigger: RotationTrigger::default(),
        }
    }
}

impl LogPolicy {
    /// Time-rotated log: midnight UTC rolls unless changed.
    pub fn timed(directory: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            filename: filename.into(),
            ..Self::default()
        }
    }

    /// Size-rotated log with the default 5 MiB threshold.
    pub fn sized(directory: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            filename: filename.into(),
            trigger: RotationTrigger::size_mbytes(DEFAULT_MAX_MBYTES),
            ..Self::default()
        }
    }

    /// Level from a free-form string; unknown values fall back to `info`.
    pub fn with_level(mut self, level: &str) -> Self {
        self.level = Some(Severity::parse_lenient(level));
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.level = Some(severity);
        self
    }

    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    pub fn with_trigger(mut self, trigger: RotationTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn log_path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let policy: LogPolicy = toml::from_str(text)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.filename.trim().is_empty() {
            return Err(UtilError::Policy("filename must not be empty".to_string()));
        }
        let encoding = self.encoding.to_ascii_lowercase().replace(['-', '_'], "");
        if encoding != "utf8" {
            return Err(UtilError::Policy(format!(
                "unsupported encoding {:?} (only UTF-8 log files are written)",
                self.encoding
            )));
        }
        if let RotationTrigger::Time { interval: 0, .. } = self.trigger {
            return Err(UtilError::Policy(
                "time trigger interval must be >= 1 (got 0)".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load and validate a policy file.
pub fn load_policy(path: impl AsRef<Path>) -> Result<LogPolicy> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(UtilError::not_found(path));
    }
    let contents = fs::read_to_string(path)?;
    LogPolicy::from_toml_str(&contents)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLevel {
    Text(String),
    Other(serde::de::IgnoredAny),
}

fn lenient_severity<'de, D>(deserializer: D) -> std::result::Result<Option<Severity>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(match RawLevel::deserialize(deserializer)? {
        RawLevel::Text(s) => Severity::parse_lenient(&s),
        RawLevel::Other(_) => {
            report(format_args!(
                "[Unable to get log level]. Default level to: 'info'"
            ));
            Severity::Info
        }
    }))
}
