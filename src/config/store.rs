// src/config/store.rs

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::config::document::IniDocument;
use crate::config::value::{Value, coerce};
use crate::errors::{Result, UtilError};
use crate::fs::{FileSystem, RealFileSystem};

pub type SectionValues = BTreeMap<String, Value>;

/// Result of [`ConfigStore::read_all`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigValues {
    /// `"section.key"` → value.
    Flat(SectionValues),
    /// section → key → value.
    Nested(BTreeMap<String, SectionValues>),
}

impl ConfigValues {
    pub fn is_empty(&self) -> bool {
        match self {
            ConfigValues::Flat(m) => m.is_empty(),
            ConfigValues::Nested(m) => m.is_empty(),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        match self {
            ConfigValues::Flat(m) => m.contains_key(key),
            ConfigValues::Nested(m) => m.contains_key(key),
        }
    }

    pub fn as_flat(&self) -> Option<&SectionValues> {
        match self {
            ConfigValues::Flat(m) => Some(m),
            ConfigValues::Nested(_) => None,
        }
    }

    pub fn as_nested(&self) -> Option<&BTreeMap<String, SectionValues>> {
        match self {
            ConfigValues::Nested(m) => Some(m),
            ConfigValues::Flat(_) => None,
        }
    }
}

/// Read and write single INI files with value coercion.
///
/// Nothing is cached: every call reads the file again, so values always
/// reflect what is currently on disk.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    fs: Arc<dyn FileSystem>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::with_fs(Arc::new(RealFileSystem))
    }

    pub fn with_fs(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// All values of the file, flattened to `"section.key"` or nested.
    ///
    /// Spaces in section and key names become underscores. Failures after the
    /// existence check are logged and yield whatever was collected so far.
    pub fn read_all(&self, path: impl AsRef<Path>, flatten: bool) -> Result<ConfigValues> {
        let path = path.as_ref();
        self.ensure_file(path)?;

        let mut flat = SectionValues::new();
        let mut nested = BTreeMap::new();

        match self.load(path) {
            Ok(doc) => {
                for section in doc.sections() {
                    let values = section_values(&doc, section.name());
                    let section_name = normalize(section.name());
                    if flatten {
                        for (key, value) in values {
                            flat.insert(format!("{section_name}.{key}"), value);
                        }
                    } else {
                        nested.insert(section_name, values);
                    }
                }
            }
            Err(e) => error!(?path, error = %e, "unable to read config file"),
        }

        Ok(if flatten {
            ConfigValues::Flat(flat)
        } else {
            ConfigValues::Nested(nested)
        })
    }

    /// Values of a single section, keyed by (underscore-normalized) key.
    pub fn read_section(&self, path: impl AsRef<Path>, section: &str) -> Result<SectionValues> {
        let path = path.as_ref();
        self.ensure_file(path)?;

        let doc = match self.load(path) {
            Ok(doc) => doc,
            Err(e) => {
                error!(?path, error = %e, "unable to read config file");
                return Ok(SectionValues::new());
            }
        };
        if doc.section(section).is_none() {
            error!(?path, section, "no such section");
            return Ok(SectionValues::new());
        }
        Ok(section_values(&doc, section))
    }

    /// One coerced value; [`Value::Absent`] when missing, empty or unreadable.
    pub fn read_value(&self, path: impl AsRef<Path>, section: &str, key: &str) -> Result<Value> {
        let path = path.as_ref();
        self.ensure_file(path)?;
        let doc = self.load(path)?;
        Ok(lookup(&doc, section, key))
    }

    /// Set `section.key` to the literal text of `value` and rewrite the file.
    ///
    /// With `quote` the text is wrapped in double quotes, which forces the next
    /// read to treat it as a string or list. Returns `false` when the file has
    /// a duplicate key.
    pub fn write_value(
        &self,
        path: impl AsRef<Path>,
        section: &str,
        key: &str,
        value: impl Display,
        quote: bool,
    ) -> Result<bool> {
        let path = path.as_ref();
        self.ensure_file(path)?;

        let mut doc = match self.load(path) {
            Ok(doc) => doc,
            Err(e @ UtilError::DuplicateOption { .. }) => {
                error!(?path, error = %e, "refusing to rewrite config file");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let text = if quote {
            format!("\"{value}\"")
        } else {
            value.to_string()
        };
        doc.set(section, key, Some(text))?;
        self.fs.write(path, doc.render().as_bytes())?;
        debug!(?path, section, key, "config value written");
        Ok(true)
    }

    fn ensure_file(&self, path: &Path) -> Result<()> {
        if self.fs.is_file(path) {
            Ok(())
        } else {
            Err(UtilError::not_found(path))
        }
    }

    fn load(&self, path: &Path) -> Result<IniDocument> {
        let text = self.fs.read_to_string(path)?;
        IniDocument::parse(&text)
    }
}

fn section_values(doc: &IniDocument, section: &str) -> SectionValues {
    let mut values = SectionValues::new();
    let keys = match doc.options(section) {
        Ok(keys) => keys,
        Err(e) => {
            error!(section, error = %e, "unable to list section keys");
            return values;
        }
    };
    for key in keys {
        values.insert(normalize(key), lookup(doc, section, key));
    }
    values
}

fn lookup(doc: &IniDocument, section: &str, key: &str) -> Value {
    let raw = match doc.get(section, key) {
        Ok(raw) => raw,
        Err(UtilError::NoOption { .. }) => return Value::Absent,
        Err(e) => {
            warn!(section, key, error = %e, "unable to resolve config value");
            return Value::Absent;
        }
    };
    coerce(raw.as_deref()).unwrap_or_else(|e| {
        warn!(section, key, error = %e, "unable to coerce config value");
        Value::Absent
    })
}

fn normalize(name: &str) -> String {
    name.replace(' ', "_")
}
