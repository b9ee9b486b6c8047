// src/logging/rotator.rs

//! What happens to a log file once it rolls over.
//!
//! Rotation runs inside the log writer while it holds the file lock, so this
//! module never emits `tracing` events: failures go straight to stderr.

use std::fmt::{self, Debug};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::fs::FileSystem;
use crate::fs::archive::compress_into;
use crate::fs::inspect::cutoff;

pub const ARCHIVE_EXTENSION: &str = "gz";

/// Longest token counted as a size-rotation sequence number. Period stamps
/// from time rotation start at eight digits (`%Y%m%d`).
const MAX_SEQUENCE_DIGITS: usize = 7;

/// Print a diagnostic to stderr in the log line layout.
pub(crate) fn report(message: fmt::Arguments<'_>) {
    eprintln!("[ERROR]:{message}");
}

/// Moves a finished log file out of the way.
///
/// `dest` is the rotation slot the writer picked: the active path with a
/// period or sequence token appended as an extra extension.
pub trait Rotator: Send + Sync + Debug {
    /// Returns the archive written, if any.
    fn rotate(&self, source: &Path, dest: &Path) -> Option<PathBuf>;
}

/// `<dir>/<stem>_<token><ext>.gz` for `source` and a rotation slot `dest`.
pub fn archive_path(source: &Path, dest: &Path) -> PathBuf {
    let token = dest
        .extension()
        .map(|t| t.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    source.with_file_name(format!("{stem}_{token}{ext}.{ARCHIVE_EXTENSION}"))
}

/// Next unused size-rotation sequence number for `source` (starting at 1).
///
/// Date-stamped archives left by time rotation are not sequence numbers.
pub fn next_sequence(fs: &dyn FileSystem, source: &Path) -> u32 {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let prefix = format!("{stem}_");
    let suffix = format!("{ext}.{ARCHIVE_EXTENSION}");

    let dir = match source.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let highest = fs
        .read_dir(dir)
        .unwrap_or_default()
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .filter_map(|name| {
            let token = name.strip_prefix(&prefix)?.strip_suffix(&suffix)?;
            if token.len() > MAX_SEQUENCE_DIGITS {
                return None;
            }
            token.parse::<u32>().ok()
        })
        .max()
        .unwrap_or(0);
    highest + 1
}

/// Gzip the finished file and prune archives past the retention window.
#[derive(Debug, Clone)]
pub struct GzipRotator {
    fs: Arc<dyn FileSystem>,
    directory: PathBuf,
    retention_days: u32,
}

impl GzipRotator {
    pub fn new(fs: Arc<dyn FileSystem>, directory: impl Into<PathBuf>, retention_days: u32) -> Self {
        Self {
            fs,
            directory: directory.into(),
            retention_days,
        }
    }

    /// Delete `.gz` files in the log directory older than the retention
    /// window. Returns how many were removed.
    pub fn remove_old_archives(&self) -> usize {
        let entries = match self.fs.read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) => {
                report(format_args!(
                    "[Unable to list log directory {:?}]:{e:#}",
                    self.directory
                ));
                return 0;
            }
        };

        let limit = cutoff(self.retention_days);
        let mut removed = 0;
        for path in entries {
            let is_archive = path
                .extension()
                .is_some_and(|e| e == ARCHIVE_EXTENSION);
            if !is_archive || !self.fs.is_file(&path) {
                continue;
            }
            let expired = self.fs.modified(&path).is_ok_and(|m| m < limit);
            if !expired {
                continue;
            }
            match self.fs.remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => report(format_args!("[Unable to remove old log {path:?}]:{e:#}")),
            }
        }
        removed
    }
}

impl Rotator for GzipRotator {
    fn rotate(&self, source: &Path, dest: &Path) -> Option<PathBuf> {
        self.remove_old_archives();

        let len = self.fs.file_len(source).unwrap_or(0);
        if !self.fs.is_file(source) || len == 0 {
            return None;
        }

        let archive = archive_path(source, dest);
        if let Err(e) = compress_into(self.fs.as_ref(), source, &archive) {
            report(format_args!("[Unable to compress {source:?}]:{e:#}"));
            if self.fs.is_file(&archive) {
                let _ = self.fs.remove_file(&archive);
            }
            return None;
        }
        if let Err(e) = self.fs.remove_file(source) {
            report(format_args!("[Unable to remove rotated log {source:?}]:{e:#}"));
        }
        Some(archive)
    }
}
