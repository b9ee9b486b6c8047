// src/logging/mod.rs

//! Rotating file logging on top of `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `DDCUTILS_LOG` environment variable (e.g. "info", "debug"), if valid
//! 2. `level` from the [`LogPolicy`]
//! 3. default to `info`
//!
//! Every event goes to the rotating log file and is mirrored to STDERR.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use tracing::Subscriber;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;

use crate::errors::{Result, UtilError};
use crate::fs::{FileSystem, RealFileSystem};

pub mod format;
pub mod policy;
pub mod rotator;
pub mod trigger;
pub mod writer;

pub use format::LineFormat;
pub use policy::{LogPolicy, RotationTrigger, When, load_policy};
pub use rotator::{GzipRotator, Rotator};
pub use writer::RotatingFileWriter;

use rotator::report;

pub const LOG_ENV_VAR: &str = "DDCUTILS_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    /// Filters like [`Severity::Error`]; `tracing` has nothing above ERROR.
    Critical,
}

impl Severity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Some(Severity::Debug),
            "info" => Some(Severity::Info),
            "warning" => Some(Severity::Warning),
            "error" => Some(Severity::Error),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }

    /// Like [`Severity::parse`], falling back to `info` with a diagnostic.
    pub fn parse_lenient(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            report(format_args!(
                "[Unable to get log level {s:?}]. Default level to: 'info'"
            ));
            Severity::Info
        })
    }

    pub fn as_level(&self) -> tracing::Level {
        match self {
            Severity::Debug => tracing::Level::DEBUG,
            Severity::Info => tracing::Level::INFO,
            Severity::Warning => tracing::Level::WARN,
            Severity::Error | Severity::Critical => tracing::Level::ERROR,
        }
    }

    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_level(self.as_level())
    }
}

/// Effective severity for a configured level, honouring [`LOG_ENV_VAR`].
pub fn resolve_severity(configured: Option<Severity>) -> Severity {
    std::env::var(LOG_ENV_VAR)
        .ok()
        .and_then(|s| Severity::parse(&s))
        .or(configured)
        .unwrap_or(Severity::Info)
}

/// Builder for the process-wide rotating logger.
#[derive(Debug, Clone)]
pub struct RotatingLog {
    policy: LogPolicy,
    fs: Arc<dyn FileSystem>,
}

/// What [`RotatingLog::init`] installed.
#[derive(Debug, Clone)]
pub struct LoggerHandle {
    path: PathBuf,
    severity: Severity,
    writer: RotatingFileWriter,
}

impl LoggerHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn writer(&self) -> &RotatingFileWriter {
        &self.writer
    }

    pub fn flush(&self) -> io::Result<()> {
        self.writer.clone().flush()
    }
}

impl RotatingLog {
    pub fn new(policy: LogPolicy) -> Self {
        Self {
            policy,
            fs: Arc::new(RealFileSystem),
        }
    }

    /// Filesystem holding the log directory, the active file and its archives.
    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn policy(&self) -> &LogPolicy {
        &self.policy
    }

    /// Install the logger as the global default subscriber.
    ///
    /// Safe to call once at startup.
    pub fn init(&self) -> Result<LoggerHandle> {
        let (handle, subscriber) = self.build()?;
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| UtilError::Other(anyhow!("unable to install log subscriber: {e}")))?;
        tracing::debug!(path = ?handle.path, severity = ?handle.severity, "rotating log installed");
        Ok(handle)
    }

    /// Prepare the log file and assemble the subscriber without installing it.
    pub fn build(&self) -> Result<(LoggerHandle, impl Subscriber + Send + Sync + 'static + use<>)> {
        self.policy.validate()?;

        let directory = &self.policy.directory;
        if !self.fs.is_dir(directory) {
            self.fs.create_dir_all(directory).map_err(|e| {
                report(format_args!("[Unable to create log directory {directory:?}]:{e:#}"));
                UtilError::from_fs(e)
            })?;
        }

        let path = self.policy.log_path();
        self.fs.open_append(&path).map_err(|e| {
            report(format_args!("[Unable to open log file {path:?}]:{e:#}"));
            UtilError::from_fs(e)
        })?;

        let severity = resolve_severity(self.policy.level);
        let rotator = GzipRotator::new(
            self.fs.clone(),
            directory.clone(),
            self.policy.retention_days,
        );
        let writer = RotatingFileWriter::open(
            &path,
            &self.policy.trigger,
            Box::new(rotator),
            self.fs.clone(),
        )?;

        let detailed = severity == Severity::Debug;
        let filter = severity.level_filter();
        let file_layer = tracing_subscriber::fmt::layer()
            .event_format(LineFormat::new(detailed))
            .with_ansi(false)
            .with_writer(writer.clone())
            .with_filter(filter);
        let console_layer = tracing_subscriber::fmt::layer()
            .event_format(LineFormat::new(detailed))
            .with_ansi(false)
            .with_writer(io::stderr)
            .with_filter(filter);
        let subscriber = tracing_subscriber::registry()
            .with(file_layer)
            .with(console_layer);

        let handle = LoggerHandle {
            path,
            severity,
            writer,
        };
        Ok((handle, subscriber))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use tempfile::tempdir;

    #[test]
    fn severity_parsing() {
        assert_eq!(Severity::parse("DEBUG"), Some(Severity::Debug));
        assert_eq!(Severity::parse(" warning "), Some(Severity::Warning));
        assert_eq!(Severity::parse("Critical"), Some(Severity::Critical));
        assert_eq!(Severity::parse("verbose"), None);
        assert_eq!(Severity::parse("warn"), None);
        assert_eq!(Severity::parse_lenient("verbose"), Severity::Info);
    }

    #[test]
    fn critical_filters_like_error() {
        assert_eq!(Severity::Critical.as_level(), tracing::Level::ERROR);
        assert_eq!(Severity::Critical.level_filter(), LevelFilter::ERROR);
        assert_eq!(Severity::Warning.level_filter(), LevelFilter::WARN);
    }

    #[test]
    fn build_creates_directory_and_file() {
        let dir = tempdir().unwrap();
        let logs = dir.path().join("nested").join("logs");
        let policy = LogPolicy::sized(&logs, "svc.log").with_severity(Severity::Info);

        let (handle, _subscriber) = RotatingLog::new(policy).build().unwrap();
        assert!(logs.is_dir());
        assert!(logs.join("svc.log").is_file());
        assert_eq!(handle.path(), logs.join("svc.log"));
    }

    #[test]
    fn events_land_in_the_file_above_the_threshold() {
        let dir = tempdir().unwrap();
        let policy = LogPolicy::sized(dir.path(), "app.log").with_severity(Severity::Warning);
        let (handle, subscriber) = RotatingLog::new(policy).build().unwrap();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("quiet");
            tracing::error!(code = 7, "loud");
        });
        handle.flush().unwrap();

        let text = std::fs::read_to_string(handle.path()).unwrap();
        assert!(!text.contains("quiet"));
        assert!(text.contains("]:[ERROR]:loud code=7"), "{text:?}");
    }

    #[test]
    fn injected_filesystem_holds_the_log_and_its_archives() {
        let mem = MockFileSystem::new();
        let policy = LogPolicy::sized("svc-logs", "app.log")
            .with_trigger(RotationTrigger::Size { max_bytes: 10 });
        let (handle, _subscriber) = RotatingLog::new(policy)
            .with_fs(Arc::new(mem.clone()))
            .build()
            .unwrap();
        assert!(mem.is_dir(Path::new("svc-logs")));

        let mut writer = handle.writer().clone();
        for _ in 0..5 {
            writer.write_all(b"0123456789abc\n").unwrap();
        }

        let mut names: Vec<_> = mem
            .read_dir(Path::new("svc-logs"))
            .unwrap()
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec!["app.log", "app_1.log.gz", "app_2.log.gz", "app_3.log.gz", "app_4.log.gz"]
        );
        assert_eq!(mem.file_len(Path::new("svc-logs/app.log")).unwrap(), 14);
    }

    #[test]
    fn unwritable_directory_is_fatal() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let policy = LogPolicy::timed(blocker.join("logs"), "app.log");

        assert!(RotatingLog::new(policy).build().is_err());
    }
}
