// src/logging/format.rs

//! Line layout shared by the file and console sinks:
//!
//! ```text
//! [2024-01-03T10:00:00.123]:[INFO]:message key=value
//! [2024-01-03T10:00:00.123]:[DEBUG]:[PID:4242]:[src/main.rs:app::jobs:57]:message
//! ```
//!
//! The process/location block is only written when the log runs at debug.

use std::fmt;

use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat {
    with_location: bool,
}

impl LineFormat {
    pub fn new(with_location: bool) -> Self {
        Self { with_location }
    }
}

pub fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARNING",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        write!(
            writer,
            "[{}]:[{}]:",
            Local::now().format(TIMESTAMP_FORMAT),
            level_name(meta.level())
        )?;
        if self.with_location {
            write!(
                writer,
                "[PID:{}]:[{}:{}:{}]:",
                std::process::id(),
                meta.file().unwrap_or("?"),
                meta.target(),
                meta.line().unwrap_or(0)
            )?;
        }
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
