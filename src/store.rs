//! Storage sink: the two filesystem operations the persistence branch needs.

use std::fs;
use std::io;
use std::path::Path;

/// Create `path` (and any missing parents) if it does not already exist.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Write `bytes` to `path`, replacing any existing file.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> io::Result<()> {
    fs::write(path, bytes)
}
