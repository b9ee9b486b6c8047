// src/fs/inspect.rs

use std::fmt;
use std::io::{self, Read};
use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::errors::{Result, UtilError};
use crate::fs::FileSystem;

const SECS_PER_DAY: u64 = 86_400;

/// Offset of the `e_lfanew` field in the DOS header.
const PE_POINTER_OFFSET: usize = 60;

/// CPU architecture recorded in a PE (Windows executable) header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryType {
    NotExe,
    Ia32,
    Ia64,
    Amd64,
    Arm32,
    Arm64,
    Unknown(u16),
}

impl BinaryType {
    fn from_machine(machine: u16) -> Self {
        match machine {
            0x014c => BinaryType::Ia32,
            0x0200 => BinaryType::Ia64,
            0x8664 => BinaryType::Amd64,
            0x01c4 => BinaryType::Arm32,
            0xaa64 => BinaryType::Arm64,
            other => BinaryType::Unknown(other),
        }
    }
}

impl fmt::Display for BinaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryType::NotExe => write!(f, "Not an EXE file"),
            BinaryType::Ia32 => write!(f, "IA32"),
            BinaryType::Ia64 => write!(f, "IA64"),
            BinaryType::Amd64 => write!(f, "AMD64"),
            BinaryType::Arm32 => write!(f, "ARM-32bits"),
            BinaryType::Arm64 => write!(f, "ARM-64bits"),
            BinaryType::Unknown(m) => write!(f, "unknown machine 0x{m:04x}"),
        }
    }
}

/// Sniff the machine type of a Windows executable.
pub fn exe_binary_type(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<BinaryType> {
    let path = path.as_ref();
    if !fs.is_file(path) {
        return Err(UtilError::not_found(path));
    }
    let mut reader = fs.open_read(path)?;

    let mut dos_header = Vec::with_capacity(PE_POINTER_OFFSET + 4);
    (&mut reader)
        .take((PE_POINTER_OFFSET + 4) as u64)
        .read_to_end(&mut dos_header)?;
    if !dos_header.starts_with(b"MZ") {
        return Ok(BinaryType::NotExe);
    }
    if dos_header.len() < PE_POINTER_OFFSET + 4 {
        return Err(truncated(path));
    }

    let mut pointer = [0u8; 4];
    pointer.copy_from_slice(&dos_header[PE_POINTER_OFFSET..PE_POINTER_OFFSET + 4]);
    let header_offset = u32::from_le_bytes(pointer) as u64;

    // Skip to the COFF header: "PE\0\0" signature, then the 2-byte machine field.
    let consumed = dos_header.len() as u64;
    let machine_at = header_offset + 4;
    if machine_at < consumed {
        return Err(truncated(path));
    }
    io::copy(&mut (&mut reader).take(machine_at - consumed), &mut io::sink())?;

    let mut machine = [0u8; 2];
    reader.read_exact(&mut machine).map_err(|_| truncated(path))?;
    Ok(BinaryType::from_machine(u16::from_le_bytes(machine)))
}

fn truncated(path: &Path) -> UtilError {
    UtilError::InvalidValue {
        raw: path.display().to_string(),
        reason: "truncated PE header".to_string(),
    }
}

/// Whether `path` was last modified more than `days` days ago.
pub fn is_older_than_days(fs: &dyn FileSystem, path: impl AsRef<Path>, days: u32) -> Result<bool> {
    let path = path.as_ref();
    if !fs.exists(path) {
        return Err(UtilError::not_found(path));
    }
    let modified = fs.modified(path)?;
    Ok(modified < cutoff(days))
}

pub(crate) fn cutoff(days: u32) -> SystemTime {
    let window = Duration::from_secs(u64::from(days) * SECS_PER_DAY);
    SystemTime::now()
        .checked_sub(window)
        .unwrap_or(SystemTime::UNIX_EPOCH)
}
