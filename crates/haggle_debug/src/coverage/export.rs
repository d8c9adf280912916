//! Coverage export and import using `MessagePack`.
//!
//! Exports carry a format version so older files are refused instead of
//! being misread.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use haggle_foundation::{Error, ErrorKind, Result};

use super::record::CoverageRecord;

/// Version written into every export.
pub const EXPORT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct CoverageExport {
    version: u32,
    records: Vec<CoverageRecord>,
}

/// Serializes records to bytes using `MessagePack` format.
///
/// Uses named serialization to preserve struct field names.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_bytes(records: &[CoverageRecord]) -> Result<Vec<u8>> {
    let export = CoverageExport {
        version: EXPORT_VERSION,
        records: records.to_vec(),
    };
    rmp_serde::to_vec_named(&export).map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
}

/// Deserializes records from `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if deserialization fails or the export has another
/// format version.
pub fn from_bytes(bytes: &[u8]) -> Result<Vec<CoverageRecord>> {
    let export: CoverageExport =
        rmp_serde::from_slice(bytes).map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))?;
    if export.version != EXPORT_VERSION {
        return Err(Error::new(ErrorKind::Serialization(format!(
            "unsupported coverage export version {} (expected {EXPORT_VERSION})",
            export.version
        ))));
    }
    Ok(export.records)
}

/// Saves records to a file, creating or overwriting it.
///
/// # Errors
///
/// Returns an error if the file cannot be written or serialization fails.
pub fn save_to_file<P: AsRef<Path>>(records: &[CoverageRecord], path: P) -> Result<()> {
    let path = path.as_ref();
    let io_error = |what: &str, e: std::io::Error| {
        Error::new(ErrorKind::Io(format!("failed to {what} file '{}': {e}", path.display())))
    };

    let bytes = to_bytes(records)?;
    let file = File::create(path).map_err(|e| io_error("create", e))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes).map_err(|e| io_error("write to", e))?;
    writer.flush().map_err(|e| io_error("flush", e))?;
    Ok(())
}

/// Loads records from a file written by [`save_to_file`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or deserialization fails.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<CoverageRecord>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| Error::new(ErrorKind::Io(format!("failed to open file '{}': {e}", path.display()))))?;
    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Error::new(ErrorKind::Io(format!("failed to read file '{}': {e}", path.display()))))?;
    from_bytes(&bytes)
}
