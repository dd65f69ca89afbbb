//! Incoming-file discovery.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Lists the files waiting in an incoming directory.
///
/// Only regular files directly inside `dir` are returned; hidden
/// (dot-prefixed) files are skipped. Returns files sorted by filename.
pub fn list_incoming_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();

        // Skip directories
        if !path.is_file() {
            continue;
        }

        let hidden = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with('.'))
            .unwrap_or(false);
        if hidden {
            continue;
        }

        files.push(path);
    }

    // Sort by filename
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// Read a source file fully into memory.
pub fn read_source_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}
