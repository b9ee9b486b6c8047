// src/fs/mock.rs

use super::FileSystem;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { content: Vec<u8>, modified: SystemTime },
    Dir(Vec<String>), // List of child names
}

/// In-memory filesystem for tests.
///
/// Cloning shares the underlying tree, so a test can keep a handle while the
/// code under test owns another.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        // Ensure root exists
        files.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            files: Arc::new(Mutex::new(files)),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.add_file_with_mtime(path, content, SystemTime::now());
    }

    pub fn add_file_with_mtime(
        &self,
        path: impl AsRef<Path>,
        content: impl Into<Vec<u8>>,
        modified: SystemTime,
    ) {
        let path = path.as_ref().to_path_buf();
        let mut files = self.lock();
        files.insert(
            path.clone(),
            MockEntry::File {
                content: content.into(),
                modified,
            },
        );
        Self::link_to_parent(&mut files, &path);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut files = self.lock();
        Self::ensure_dir_entry(&mut files, path.as_ref());
    }

    /// Raw bytes of a file, if present.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.lock().get(path.as_ref()) {
            Some(MockEntry::File { content, .. }) => Some(content.clone()),
            _ => None,
        }
    }

    /// Create an empty file at `path` unless something is already there.
    fn touch(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if !files.contains_key(path) {
            files.insert(
                path.to_path_buf(),
                MockEntry::File {
                    content: Vec::new(),
                    modified: SystemTime::now(),
                },
            );
            Self::link_to_parent(files, path);
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, MockEntry>> {
        // A panicking test must not take every other assertion down with it.
        self.files.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn parent_of(path: &Path) -> Option<&Path> {
        path.parent().map(|parent| {
            if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            }
        })
    }

    fn link_to_parent(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let Some(parent) = Self::parent_of(path) else {
            return;
        };
        if parent == path {
            return;
        }
        Self::ensure_dir_entry(files, parent);
        if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if !children.iter().any(|c| c == name) {
                    children.push(name.to_string());
                }
            }
        }
    }

    fn ensure_dir_entry(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if !files.contains_key(path) {
            files.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
            Self::link_to_parent(files, path);
        }
    }
}

/// Appending handle into a [`MockFileSystem`] file.
#[derive(Debug)]
struct MockAppender {
    fs: MockFileSystem,
    path: PathBuf,
}

impl Write for MockAppender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut files = self.fs.lock();
        // The file may have been rotated away under a live handle.
        MockFileSystem::touch(&mut files, &self.path);
        match files.get_mut(&self.path) {
            Some(MockEntry::File { content, modified }) => {
                content.extend_from_slice(buf);
                *modified = SystemTime::now();
                Ok(buf.len())
            }
            _ => Err(io::Error::other(format!("Is a directory: {:?}", self.path))),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let files = self.lock();
        match files.get(path) {
            Some(MockEntry::File { content, .. }) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let files = self.lock();
        match files.get(path) {
            Some(MockEntry::File { content, .. }) => Ok(Box::new(Cursor::new(content.clone()))),
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn open_append(&self, path: &Path) -> Result<Box<dyn Write + Send>> {
        let mut files = self.lock();
        if let Some(MockEntry::Dir(_)) = files.get(path) {
            return Err(anyhow!("Is a directory: {:?}", path));
        }
        Self::touch(&mut files, path);
        Ok(Box::new(MockAppender {
            fs: self.clone(),
            path: path.to_path_buf(),
        }))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.add_file(path, contents);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let mut files = self.lock();
        match files.get(path) {
            Some(MockEntry::File { .. }) => {
                files.remove(path);
            }
            Some(MockEntry::Dir(_)) => return Err(anyhow!("Is a directory: {:?}", path)),
            None => return Err(anyhow!("File not found: {:?}", path)),
        }
        if let Some(parent) = Self::parent_of(path) {
            if let (Some(MockEntry::Dir(children)), Some(name)) = (
                files.get_mut(parent),
                path.file_name().and_then(|n| n.to_str()),
            ) {
                children.retain(|c| c != name);
            }
        }
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.add_dir(path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.lock().contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::File { .. }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::Dir(_)))
    }

    fn file_len(&self, path: &Path) -> Result<u64> {
        match self.lock().get(path) {
            Some(MockEntry::File { content, .. }) => Ok(content.len() as u64),
            _ => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        match self.lock().get(path) {
            Some(MockEntry::File { modified, .. }) => Ok(*modified),
            Some(MockEntry::Dir(_)) => Ok(SystemTime::now()),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn set_modified(&self, path: &Path, time: SystemTime) -> Result<()> {
        match self.lock().get_mut(path) {
            Some(MockEntry::File { modified, .. }) => {
                *modified = time;
                Ok(())
            }
            _ => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let files = self.lock();
        match files.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn add_and_remove_file_updates_parent_listing() {
        let fs = MockFileSystem::new();
        fs.add_file("logs/app_1.log.gz", b"x".to_vec());

        let listed = fs.read_dir(Path::new("logs")).unwrap();
        assert_eq!(listed, vec![PathBuf::from("logs/app_1.log.gz")]);

        fs.remove_file(Path::new("logs/app_1.log.gz")).unwrap();
        assert!(fs.read_dir(Path::new("logs")).unwrap().is_empty());
        assert!(!fs.exists(Path::new("logs/app_1.log.gz")));
    }

    #[test]
    fn append_handle_creates_and_extends_file() {
        let fs = MockFileSystem::new();
        let mut out = fs.open_append(Path::new("logs/app.log")).unwrap();
        assert_eq!(fs.file_len(Path::new("logs/app.log")).unwrap(), 0);
        assert_eq!(fs.read_dir(Path::new("logs")).unwrap().len(), 1);

        out.write_all(b"one\n").unwrap();
        out.write_all(b"two\n").unwrap();
        assert_eq!(fs.contents("logs/app.log").unwrap(), b"one\ntwo\n".to_vec());
        assert!(fs.open_append(Path::new("logs")).is_err());
    }

    #[test]
    fn mtime_round_trips() {
        let fs = MockFileSystem::new();
        let old = SystemTime::now() - Duration::from_secs(3600);
        fs.add_file("a.txt", b"a".to_vec());
        fs.set_modified(Path::new("a.txt"), old).unwrap();
        assert_eq!(fs.modified(Path::new("a.txt")).unwrap(), old);
    }
}
