// src/errors.rs

//! Crate-wide error type.
//!
//! Missing input paths surface as [`UtilError::NotFound`], which carries the
//! POSIX `ENOENT` semantics (errno 2, "No such file or directory").

use std::path::PathBuf;

use thiserror::Error;

/// POSIX errno for "No such file or directory".
pub const ENOENT: i32 = 2;

const ENOENT_MESSAGE: &str = "No such file or directory";

#[derive(Error, Debug)]
pub enum UtilError {
    #[error("[Errno 2] No such file or directory: {0:?}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("File contains no section headers (line {line}): {content:?}")]
    MissingSectionHeader { line: usize, content: String },

    #[error("Section {section:?} already exists (line {line})")]
    DuplicateSection { section: String, line: usize },

    #[error("Option {key:?} in section {section:?} already exists (line {line})")]
    DuplicateOption {
        section: String,
        key: String,
        line: usize,
    },

    #[error("No section: {0:?}")]
    NoSection(String),

    #[error("No option {key:?} in section {section:?}")]
    NoOption { section: String, key: String },

    #[error("Interpolation error: {0}")]
    Interpolation(String),

    #[error("Invalid value {raw:?}: {reason}")]
    InvalidValue { raw: String, reason: String },

    #[error("Fernet key must be 32 url-safe base64-encoded bytes.")]
    InvalidKey,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Log policy error: {0}")]
    Policy(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl UtilError {
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        UtilError::NotFound(path.into())
    }

    /// POSIX errno carried by this error, if any.
    pub fn errno(&self) -> Option<i32> {
        match self {
            UtilError::NotFound(_) => Some(ENOENT),
            UtilError::IoError(e) => e.raw_os_error().or(match e.kind() {
                std::io::ErrorKind::NotFound => Some(ENOENT),
                _ => None,
            }),
            _ => None,
        }
    }

    /// The `strerror` text matching [`UtilError::errno`].
    pub fn strerror(&self) -> Option<&'static str> {
        match self.errno() {
            Some(ENOENT) => Some(ENOENT_MESSAGE),
            _ => None,
        }
    }

    /// Wrap a [`crate::fs::FileSystem`] failure, keeping an underlying
    /// `io::Error` (and so its errno) when there is one.
    pub fn from_fs(err: anyhow::Error) -> Self {
        match err.downcast::<std::io::Error>() {
            Ok(io) => UtilError::IoError(io),
            Err(other) => UtilError::Other(other),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.errno() == Some(ENOENT)
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, UtilError>;
