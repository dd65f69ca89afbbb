//! Append-only violation log.
//!
//! One JSON object per line, one line per rejected file. The sink is opened
//! once per batch and shared by all workers; each entry is encoded up front
//! and written with a single `write_all` under the mutex, so lines never
//! interleave.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tdv_model::{FileVerdict, Violation};

use crate::error::{OutputError, Result};

/// File name of the violation log inside the log directory.
pub const VIOLATION_LOG_FILE: &str = "errors.jsonl";

/// One rejected file, as written to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub source_path: PathBuf,
    pub file_name: String,
    pub sha256: String,
    /// RFC 3339, UTC.
    pub occurred_at: String,
    /// Where the file was placed in the rejected directory.
    pub destination: PathBuf,
    pub total_records: usize,
    pub violations: Vec<Violation>,
}

impl LogEntry {
    /// Entry for a rejected verdict about to be moved to `destination`.
    pub fn for_verdict(verdict: &FileVerdict, sha256: &str, destination: &Path) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_path: verdict.source_path().to_path_buf(),
            file_name: verdict.file_name(),
            sha256: sha256.to_string(),
            occurred_at: Utc::now().to_rfc3339(),
            destination: destination.to_path_buf(),
            total_records: verdict.total_records(),
            violations: verdict.violations().to_vec(),
        }
    }
}

/// Shared append-mode handle on the violation log.
#[derive(Debug)]
pub struct ViolationLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl ViolationLog {
    /// Open (or create) the log in append mode. Creates the parent directory.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| OutputError::io("create directory", parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| OutputError::io("open", path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry as a single line and flush it to the OS.
    pub fn append(&self, entry: &LogEntry) -> Result<()> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.write_all(&line)
            .and_then(|()| file.flush())
            .map_err(|e| OutputError::io("append to", &self.path, e))
    }
}

/// Read every entry back from a log file.
pub fn read_log(path: &Path) -> Result<Vec<LogEntry>> {
    let file = File::open(path).map_err(|e| OutputError::io("open", path, e))?;
    let mut entries = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| OutputError::io("read", path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let entry = serde_json::from_str(&line).map_err(|e| OutputError::Decode {
            path: path.to_path_buf(),
            line: idx + 1,
            message: e.to_string(),
        })?;
        entries.push(entry);
    }
    Ok(entries)
}
