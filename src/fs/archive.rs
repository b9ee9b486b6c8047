// src/fs/archive.rs

//! Gzip helpers over the [`FileSystem`] abstraction.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{debug, error};

use crate::errors::{Result, UtilError};
use crate::fs::FileSystem;

/// Compress `source` into `dest` with gzip.
///
/// The compressed stream is assembled in memory and written in one call, so a
/// failed read never leaves a truncated archive behind. Emits no log events:
/// the log rotator calls this while holding the log file lock.
pub fn compress_into(fs: &dyn FileSystem, source: &Path, dest: &Path) -> anyhow::Result<u64> {
    let mut reader = fs.open_read(source)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    let copied = io::copy(&mut reader, &mut encoder)
        .with_context(|| format!("compressing {:?}", source))?;
    encoder.flush()?;
    let bytes = encoder
        .finish()
        .with_context(|| format!("finishing gzip stream for {:?}", source))?;
    fs.write(dest, &bytes)?;
    Ok(copied)
}

/// Gzip a single file into `<output_dir>/<file name>.gz`.
///
/// `output_dir` defaults to the input's own directory. On failure any partial
/// output is removed and the error is returned.
pub fn gzip_file(
    fs: &dyn FileSystem,
    input: impl AsRef<Path>,
    output_dir: Option<&Path>,
) -> Result<PathBuf> {
    let input = input.as_ref();
    if !fs.is_file(input) {
        return Err(UtilError::not_found(input));
    }

    let file_name = input
        .file_name()
        .ok_or_else(|| UtilError::not_found(input))?
        .to_string_lossy()
        .into_owned();
    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let output = dir.join(format!("{file_name}.gz"));

    match compress_into(fs, input, &output) {
        Ok(bytes_in) => {
            debug!(?input, ?output, bytes_in, "gzip complete");
            Ok(output)
        }
        Err(e) => {
            error!(?input, error = %e, "unable to gzip file");
            if fs.is_file(&output) {
                let _ = fs.remove_file(&output);
            }
            Err(e.into())
        }
    }
}
