// src/config/mod.rs

//! INI configuration files.
//!
//! Responsibilities:
//! - Parse and render INI text (`document.rs`).
//! - Resolve `${...}` references (`interpolation.rs`).
//! - Coerce raw strings into typed values (`value.rs`).
//! - File-level read/write entry points (`store.rs`).

pub mod document;
pub mod interpolation;
pub mod store;
pub mod value;

pub use document::{DEFAULT_SECTION, IniDocument};
pub use store::{ConfigStore, ConfigValues, SectionValues};
pub use value::{Item, Value, coerce};
