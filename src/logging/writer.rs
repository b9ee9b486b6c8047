// src/logging/writer.rs

//! Rotating file sink plugged into `tracing-subscriber` as a [`MakeWriter`].

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use tracing_subscriber::fmt::MakeWriter;

use crate::fs::FileSystem;
use crate::logging::policy::RotationTrigger;
use crate::logging::rotator::{Rotator, archive_path, next_sequence, report};
use crate::logging::trigger::TriggerState;

/// Append-only log file that rotates itself before a record would cross the
/// configured boundary.
///
/// Clones share the same file handle; every formatted event arrives as one
/// `write` call, so records are never split across files.
#[derive(Debug, Clone)]
pub struct RotatingFileWriter {
    inner: Arc<Mutex<ActiveLog>>,
}

struct ActiveLog {
    path: PathBuf,
    file: Option<Box<dyn Write + Send>>,
    size: u64,
    trigger: TriggerState,
    rotator: Box<dyn Rotator>,
    fs: Arc<dyn FileSystem>,
}

impl fmt::Debug for ActiveLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveLog")
            .field("path", &self.path)
            .field("open", &self.file.is_some())
            .field("size", &self.size)
            .field("trigger", &self.trigger)
            .field("rotator", &self.rotator)
            .finish_non_exhaustive()
    }
}

impl RotatingFileWriter {
    /// Open (or create) `path` for appending through `fs`.
    ///
    /// A time schedule starts from the existing file's mtime, so a log left
    /// over from an earlier period rotates on the first write.
    pub fn open(
        path: impl Into<PathBuf>,
        trigger: &RotationTrigger,
        rotator: Box<dyn Rotator>,
        fs: Arc<dyn FileSystem>,
    ) -> io::Result<Self> {
        let path = path.into();
        let created = fs
            .modified(&path)
            .ok()
            .map(epoch_secs)
            .unwrap_or_else(now_secs);

        let file = fs.open_append(&path).map_err(io::Error::other)?;
        let size = fs.file_len(&path).unwrap_or(0);

        Ok(Self {
            inner: Arc::new(Mutex::new(ActiveLog {
                path,
                file: Some(file),
                size,
                trigger: TriggerState::new(trigger, created),
                rotator,
                fs,
            })),
        })
    }

    pub fn path(&self) -> PathBuf {
        self.lock().path.clone()
    }

    /// Rotate immediately, regardless of the trigger.
    pub fn rotate_now(&self) -> io::Result<()> {
        self.lock().rollover(now_secs())
    }

    fn lock(&self) -> MutexGuard<'_, ActiveLog> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl ActiveLog {
    fn write_record(&mut self, buf: &[u8]) -> io::Result<usize> {
        let now = now_secs();
        if self.trigger.should_rollover(now, self.size, buf.len() as u64) {
            self.rollover(now)?;
        }
        if self.file.is_none() {
            self.reopen()?;
        }
        let Some(file) = self.file.as_mut() else {
            return Err(io::Error::other("log file is not open"));
        };
        file.write_all(buf)?;
        self.size += buf.len() as u64;
        Ok(buf.len())
    }

    fn rollover(&mut self, now: i64) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            if let Err(e) = file.flush() {
                report(format_args!("[Unable to flush {:?} before rotation]:{e}", self.path));
            }
        }
        let slot = self.rotation_slot();
        self.rotator.rotate(&self.path, &slot);
        if let TriggerState::Time(schedule) = &mut self.trigger {
            schedule.advance(now);
        }
        self.reopen()
    }

    fn reopen(&mut self) -> io::Result<()> {
        let file = self.fs.open_append(&self.path).map_err(io::Error::other)?;
        self.size = self.fs.file_len(&self.path).unwrap_or(0);
        self.file = Some(file);
        Ok(())
    }

    /// Active path plus the token naming the finished file.
    fn rotation_slot(&self) -> PathBuf {
        match &self.trigger {
            TriggerState::Size { .. } => {
                let seq = next_sequence(self.fs.as_ref(), &self.path);
                with_token(&self.path, &seq.to_string())
            }
            TriggerState::Time(schedule) => {
                let token = schedule.suffix();
                let mut slot = with_token(&self.path, &token);
                let mut n = 2;
                while self.fs.exists(&archive_path(&self.path, &slot)) {
                    slot = with_token(&self.path, &format!("{token}-{n}"));
                    n += 1;
                }
                slot
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl Write for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().write_record(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().flush()
    }
}

impl<'a> MakeWriter<'a> for RotatingFileWriter {
    type Writer = RotatingFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn with_token(path: &Path, token: &str) -> PathBuf {
    let mut slot = path.as_os_str().to_owned();
    slot.push(".");
    slot.push(token);
    PathBuf::from(slot)
}

fn epoch_secs(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn now_secs() -> i64 {
    Utc::now().timestamp()
}
