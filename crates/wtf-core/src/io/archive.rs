//! In-memory zip extraction.

use std::io::{Cursor, Read};

use zip::ZipArchive;
use zip::result::ZipError;

/// Read the entry called exactly `name` out of a zip archive held in memory.
///
/// Returns `Ok(None)` when the archive is well formed but has no such entry.
pub fn read_entry(archive: &[u8], name: &str) -> Result<Option<Vec<u8>>, ZipError> {
    let mut archive = ZipArchive::new(Cursor::new(archive))?;
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e),
    };

    let mut bytes = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
    entry.read_to_end(&mut bytes)?;
    Ok(Some(bytes))
}
