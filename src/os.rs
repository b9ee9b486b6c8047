// src/os.rs

//! Host platform detection and per-user directories.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use directories::{BaseDirs, UserDirs};
use tracing::{debug, error};

use crate::errors::{Result, UtilError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    /// Platform this binary was built for.
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => Platform::Windows,
            "macos" => Platform::MacOs,
            "linux" => Platform::Linux,
            _ => Platform::Other,
        }
    }

    /// Program and leading arguments that open a path with its default
    /// application.
    pub fn open_command(&self) -> (&'static str, &'static [&'static str]) {
        match self {
            // `start` treats the first quoted argument as a window title.
            Platform::Windows => ("cmd", &["/C", "start", ""]),
            Platform::MacOs => ("open", &[]),
            Platform::Linux | Platform::Other => ("xdg-open", &[]),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Windows => write!(f, "Windows"),
            Platform::MacOs => write!(f, "Darwin"),
            Platform::Linux => write!(f, "Linux"),
            Platform::Other => write!(f, "{}", std::env::consts::OS),
        }
    }
}

/// Open `path` in the platform's file browser or default application.
///
/// Returns whether the opener exited successfully.
pub fn show(platform: Platform, path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(UtilError::not_found(path));
    }

    let (program, args) = platform.open_command();
    let status = Command::new(program)
        .args(args)
        .arg(path)
        .status()
        .map_err(|e| {
            error!(program, ?path, error = %e, "unable to launch opener");
            UtilError::IoError(e)
        })?;
    debug!(program, ?path, code = ?status.code(), "opener finished");
    Ok(status.success())
}

/// The user's pictures directory, or `$HOME/Pictures`.
pub fn pictures_dir() -> PathBuf {
    UserDirs::new()
        .and_then(|dirs| dirs.picture_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| home_child("Pictures"))
}

/// The user's downloads directory, or `$HOME/Downloads`.
pub fn downloads_dir() -> PathBuf {
    UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| home_child("Downloads"))
}

fn home_child(name: &str) -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~"))
        .join(name)
}
