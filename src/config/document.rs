// src/config/document.rs

//! In-memory INI document: parsing and rendering.
//!
//! Format accepted by [`IniDocument::parse`]:
//!
//! ```ini
//! [DEFAULT]
//! root = /srv
//!
//! [Database Credentials]
//! ; full-line comments start with `;` or `#`
//! host = localhost
//! port = 5432
//! path = ${root}/db
//! description = first line
//!     continued on an indented line
//! bare_key
//! ```
//!
//! `=` is the only delimiter, keys keep their case, and a key may appear
//! without a value. Entries under `[DEFAULT]` are visible from every section.

use crate::config::interpolation;
use crate::errors::{Result, UtilError};

/// Name of the section whose entries every other section inherits.
pub const DEFAULT_SECTION: &str = "DEFAULT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: String,
    value: Option<String>,
}

impl Entry {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw (uninterpolated) value; `None` for a bare key.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<Entry>,
}

impl Section {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key == key)
    }

    fn set(&mut self, key: &str, value: Option<String>) {
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => entry.value = value,
            None => self.entries.push(Entry {
                key: key.to_string(),
                value,
            }),
        }
    }

    fn render_into(&self, out: &mut String) {
        out.push('[');
        out.push_str(&self.name);
        out.push_str("]\n");
        for entry in &self.entries {
            out.push_str(&entry.key);
            if let Some(value) = &entry.value {
                out.push('=');
                out.push_str(&value.replace('\n', "\n\t"));
            }
            out.push('\n');
        }
        out.push('\n');
    }
}

#[derive(Debug, Clone, Copy)]
enum Cursor {
    Defaults,
    Section(usize),
}

/// Where the last key was written, for indented continuation lines.
#[derive(Debug, Clone, Copy)]
struct OpenValue {
    cursor: Cursor,
    entry: usize,
    indent: usize,
}

/// A parsed INI file. Built fresh from text on every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniDocument {
    defaults: Section,
    sections: Vec<Section>,
}

impl Default for IniDocument {
    fn default() -> Self {
        Self {
            defaults: Section::new(DEFAULT_SECTION),
            sections: Vec::new(),
        }
    }
}

impl IniDocument {
    pub fn parse(text: &str) -> Result<Self> {
        let mut doc = IniDocument::default();
        let mut cursor: Option<Cursor> = None;
        let mut open: Option<OpenValue> = None;
        // Blank lines seen since the last value line; kept only if the
        // value continues after them.
        let mut blanks = 0;

        for (idx, line) in text.lines().enumerate() {
            let lineno = idx + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() {
                blanks += 1;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let indent = line.len() - line.trim_start().len();
            let skipped = std::mem::take(&mut blanks);

            if let Some(prev) = open {
                if indent > prev.indent {
                    let section = doc.section_at_mut(prev.cursor);
                    let entry = &mut section.entries[prev.entry];
                    match entry.value.as_mut() {
                        Some(value) => {
                            for _ in 0..=skipped {
                                value.push('\n');
                            }
                            value.push_str(trimmed);
                        }
                        None => {
                            return Err(UtilError::Parse {
                                line: lineno,
                                message: format!(
                                    "key {:?} has no value to continue",
                                    entry.key
                                ),
                            });
                        }
                    }
                    continue;
                }
            }

            if trimmed.starts_with('[') && trimmed.ends_with(']') && trimmed.len() > 2 {
                let name = &trimmed[1..trimmed.len() - 1];
                cursor = Some(doc.open_section(name, lineno)?);
                open = None;
                continue;
            }

            let Some(current) = cursor else {
                return Err(UtilError::MissingSectionHeader {
                    line: lineno,
                    content: line.to_string(),
                });
            };

            let (key, value) = match trimmed.split_once('=') {
                Some((k, v)) => (k.trim(), Some(v.trim().to_string())),
                None => (trimmed, None),
            };
            if key.is_empty() {
                return Err(UtilError::Parse {
                    line: lineno,
                    message: format!("missing key before '=': {line:?}"),
                });
            }

            let section = doc.section_at_mut(current);
            if section.get(key).is_some() {
                return Err(UtilError::DuplicateOption {
                    section: section.name.clone(),
                    key: key.to_string(),
                    line: lineno,
                });
            }
            section.entries.push(Entry {
                key: key.to_string(),
                value,
            });
            open = Some(OpenValue {
                cursor: current,
                entry: section.entries.len() - 1,
                indent,
            });
        }

        Ok(doc)
    }

    fn open_section(&mut self, name: &str, lineno: usize) -> Result<Cursor> {
        if name == DEFAULT_SECTION {
            return Ok(Cursor::Defaults);
        }
        if self.has_section(name) {
            return Err(UtilError::DuplicateSection {
                section: name.to_string(),
                line: lineno,
            });
        }
        self.sections.push(Section::new(name));
        Ok(Cursor::Section(self.sections.len() - 1))
    }

    fn section_at_mut(&mut self, cursor: Cursor) -> &mut Section {
        match cursor {
            Cursor::Defaults => &mut self.defaults,
            Cursor::Section(i) => &mut self.sections[i],
        }
    }

    /// Named sections in file order (excludes `DEFAULT`).
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn defaults(&self) -> &Section {
        &self.defaults
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.iter().any(|s| s.name == name)
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        if name == DEFAULT_SECTION {
            return Some(&self.defaults);
        }
        self.sections.iter().find(|s| s.name == name)
    }

    /// Keys visible from `section`: its own first, then inherited defaults.
    pub fn options(&self, section: &str) -> Result<Vec<&str>> {
        let own = self
            .section(section)
            .ok_or_else(|| UtilError::NoSection(section.to_string()))?;
        let mut keys: Vec<&str> = own.entries.iter().map(|e| e.key.as_str()).collect();
        if section != DEFAULT_SECTION {
            for entry in &self.defaults.entries {
                if own.get(&entry.key).is_none() {
                    keys.push(&entry.key);
                }
            }
        }
        Ok(keys)
    }

    /// Raw value lookup with `DEFAULT` fallback. The inner `None` is a bare key.
    pub fn get_raw(&self, section: &str, key: &str) -> Result<Option<&str>> {
        let own = self
            .section(section)
            .ok_or_else(|| UtilError::NoSection(section.to_string()))?;
        own.get(key)
            .or_else(|| self.defaults.get(key))
            .map(Entry::value)
            .ok_or_else(|| UtilError::NoOption {
                section: section.to_string(),
                key: key.to_string(),
            })
    }

    /// Value lookup with `${...}` references resolved.
    pub fn get(&self, section: &str, key: &str) -> Result<Option<String>> {
        match self.get_raw(section, key)? {
            Some(raw) => interpolation::expand(self, section, raw).map(Some),
            None => Ok(None),
        }
    }

    /// Set a raw value. The section must exist (or be `DEFAULT`).
    pub fn set(&mut self, section: &str, key: &str, value: Option<String>) -> Result<()> {
        if let Some(v) = &value {
            interpolation::check_syntax(v)?;
        }
        let target = if section == DEFAULT_SECTION {
            &mut self.defaults
        } else {
            self.sections
                .iter_mut()
                .find(|s| s.name == section)
                .ok_or_else(|| UtilError::NoSection(section.to_string()))?
        };
        target.set(key, value);
        Ok(())
    }

    /// Serialize back to INI text: `DEFAULT` first (when non-empty), then each
    /// section followed by a blank line. Comments are not preserved.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.defaults.entries.is_empty() {
            self.defaults.render_into(&mut out);
        }
        for section in &self.sections {
            section.render_into(&mut out);
        }
        out
    }
}
