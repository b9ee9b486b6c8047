#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Builder for INI text to simplify test setup.
///
/// ```ignore
/// let path = IniBuilder::new()
///     .section("main")
///     .entry("files", "a.txt,b.txt")
///     .write_to(dir.path(), "settings.ini")?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct IniBuilder {
    lines: Vec<String>,
}

impl IniBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a section; a blank line separates it from the previous one.
    pub fn section(mut self, name: &str) -> Self {
        if !self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.lines.push(format!("[{name}]"));
        self
    }

    pub fn entry(mut self, key: &str, value: &str) -> Self {
        self.lines.push(format!("{key} = {value}"));
        self
    }

    /// Key without a value.
    pub fn bare(mut self, key: &str) -> Self {
        self.lines.push(key.to_string());
        self
    }

    pub fn comment(mut self, text: &str) -> Self {
        self.lines.push(format!("# {text}"));
        self
    }

    /// Line copied verbatim, e.g. a continuation or a deliberately broken line.
    pub fn raw(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn build(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    pub fn write_to(&self, dir: &Path, name: &str) -> anyhow::Result<PathBuf> {
        let path = dir.join(name);
        fs::write(&path, self.build())?;
        Ok(path)
    }
}
