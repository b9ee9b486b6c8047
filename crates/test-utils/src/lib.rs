pub mod builders;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::{Duration, SystemTime};

use anyhow::Result;
use ddcutils::fs::{FileSystem, RealFileSystem};
use tracing_subscriber::{EnvFilter, fmt};

pub use builders::IniBuilder;

static INIT: Once = Once::new();

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Push a file's mtime `days` days into the past.
pub fn age_file(path: impl AsRef<Path>, days: u64) -> Result<()> {
    let when = SystemTime::now() - Duration::from_secs(days * SECS_PER_DAY);
    RealFileSystem.set_modified(path.as_ref(), when)
}

/// Write `len` bytes of filler text to `path`.
pub fn write_filler(path: impl AsRef<Path>, len: usize) -> Result<PathBuf> {
    let path = path.as_ref();
    let line = b"0123456789abcdefghijklmnopqrstuvwxyz\n";
    let content: Vec<u8> = line.iter().copied().cycle().take(len).collect();
    fs::write(path, content)?;
    Ok(path.to_path_buf())
}

/// Names of the entries in `dir` ending with `suffix`, sorted.
pub fn files_ending_with(dir: impl AsRef<Path>, suffix: &str) -> Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(suffix))
        .collect();
    names.sort();
    Ok(names)
}
