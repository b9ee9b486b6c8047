// src/lib.rs

//! Small utilities shared by command-line tools:
//!
//! - [`config`]: INI files with `${...}` interpolation and typed reads.
//! - [`logging`]: rotating, gzip-archiving log files for `tracing`.
//! - [`fs`]: filesystem abstraction plus gzip / PE / age helpers.
//! - [`crypto`]: Fernet encryption of stored secrets.
//! - [`misc`], [`os`]: date formatting, git branch, prompts, platform paths.

pub mod config;
pub mod crypto;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod misc;
pub mod os;

pub use config::{ConfigStore, ConfigValues, IniDocument, Item, SectionValues, Value};
pub use crypto::Cipher;
pub use errors::{Result, UtilError};
pub use logging::{LogPolicy, LoggerHandle, RotatingLog, Severity};
