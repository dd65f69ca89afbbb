//! Ledger of content hashes already archived.
//!
//! Backed by a JSON-lines file that only grows. In-flight files hold a claim
//! on their hash; a second file with the same content waits until that claim
//! is committed (duplicate) or released (validated on its own).

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OutputError, Result};

/// File name of the seen-file ledger inside the log directory.
pub const SEEN_LEDGER_FILE: &str = "seen_files.jsonl";

/// One archived file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenEntry {
    pub sha256: String,
    pub file_name: String,
    /// RFC 3339, UTC.
    pub first_seen: String,
}

/// Result of claiming a content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// The caller now holds the hash and must `commit` or `release` it.
    Fresh,
    /// The hash belongs to an archived file.
    Seen { file_name: String },
}

#[derive(Debug, Default)]
struct LedgerState {
    archived: HashMap<String, String>,
    pending: HashMap<String, String>,
}

/// Shared handle on the seen-file ledger.
#[derive(Debug)]
pub struct SeenLedger {
    path: PathBuf,
    sink: Option<Mutex<File>>,
    state: Mutex<LedgerState>,
    settled: Condvar,
}

impl SeenLedger {
    /// Load the ledger and open it for appending. Creates the file if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| OutputError::io("create directory", parent, e))?;
        }
        let archived = load_entries(path)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| OutputError::io("open", path, e))?;
        debug!(path = %path.display(), entries = archived.len(), "seen ledger loaded");
        Ok(Self {
            path: path.to_path_buf(),
            sink: Some(Mutex::new(file)),
            state: Mutex::new(LedgerState {
                archived,
                pending: HashMap::new(),
            }),
            settled: Condvar::new(),
        })
    }

    /// Load the ledger without ever writing to it. A missing file is empty.
    pub fn read_only(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            sink: None,
            state: Mutex::new(LedgerState {
                archived: load_entries(path)?,
                pending: HashMap::new(),
            }),
            settled: Condvar::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of archived hashes.
    pub fn len(&self) -> usize {
        self.lock_state().archived.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Claim `sha256` for `file_name`, or report the archived original.
    ///
    /// Blocks while another file holds a claim on the same hash. Every
    /// `Fresh` claim must be settled with `commit` or `release`.
    pub fn claim(&self, sha256: &str, file_name: &str) -> Claim {
        let mut state = self.lock_state();
        loop {
            if let Some(original) = state.archived.get(sha256) {
                return Claim::Seen {
                    file_name: original.clone(),
                };
            }
            if !state.pending.contains_key(sha256) {
                break;
            }
            state = self
                .settled
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state
            .pending
            .insert(sha256.to_string(), file_name.to_string());
        Claim::Fresh
    }

    /// Mark a claimed hash as archived and persist it.
    pub fn commit(&self, sha256: &str) -> Result<()> {
        let file_name = {
            let mut state = self.lock_state();
            let Some(file_name) = state.pending.remove(sha256) else {
                return Ok(());
            };
            state
                .archived
                .insert(sha256.to_string(), file_name.clone());
            file_name
        };
        self.settled.notify_all();

        let Some(sink) = &self.sink else {
            return Ok(());
        };
        let entry = SeenEntry {
            sha256: sha256.to_string(),
            file_name,
            first_seen: Utc::now().to_rfc3339(),
        };
        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');
        let mut file = sink.lock().unwrap_or_else(PoisonError::into_inner);
        file.write_all(&line)
            .and_then(|()| file.flush())
            .map_err(|e| OutputError::io("append to", &self.path, e))
    }

    /// Drop a claim without archiving.
    pub fn release(&self, sha256: &str) {
        self.lock_state().pending.remove(sha256);
        self.settled.notify_all();
    }

    fn lock_state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load_entries(path: &Path) -> Result<HashMap<String, String>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(error) => return Err(OutputError::io("open", path, error)),
    };

    let mut archived = HashMap::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| OutputError::io("read", path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: SeenEntry = serde_json::from_str(&line).map_err(|e| OutputError::Decode {
            path: path.to_path_buf(),
            line: idx + 1,
            message: e.to_string(),
        })?;
        archived.entry(entry.sha256).or_insert(entry.file_name);
    }
    Ok(archived)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn claim_commit_persists_across_opens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SEEN_LEDGER_FILE);

        let ledger = SeenLedger::open(&path).unwrap();
        assert_eq!(ledger.claim("h1", "a.csv"), Claim::Fresh);
        ledger.commit("h1").unwrap();

        let reopened = SeenLedger::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(
            reopened.claim("h1", "b.csv"),
            Claim::Seen {
                file_name: "a.csv".to_string()
            }
        );
    }

    #[test]
    fn released_claim_hands_hash_to_waiter() {
        let dir = TempDir::new().unwrap();
        let ledger = SeenLedger::open(&dir.path().join(SEEN_LEDGER_FILE)).unwrap();

        assert_eq!(ledger.claim("h1", "a.csv"), Claim::Fresh);
        let waited = std::thread::scope(|scope| {
            let waiter = scope.spawn(|| ledger.claim("h1", "b.csv"));
            std::thread::sleep(Duration::from_millis(50));
            ledger.release("h1");
            waiter.join().unwrap()
        });

        assert_eq!(waited, Claim::Fresh);
        assert!(ledger.is_empty());
    }

    #[test]
    fn committed_claim_makes_waiter_a_duplicate() {
        let dir = TempDir::new().unwrap();
        let ledger = SeenLedger::open(&dir.path().join(SEEN_LEDGER_FILE)).unwrap();

        assert_eq!(ledger.claim("h1", "a.csv"), Claim::Fresh);
        let waited = std::thread::scope(|scope| {
            let waiter = scope.spawn(|| ledger.claim("h1", "b.csv"));
            std::thread::sleep(Duration::from_millis(50));
            ledger.commit("h1").unwrap();
            waiter.join().unwrap()
        });

        assert_eq!(
            waited,
            Claim::Seen {
                file_name: "a.csv".to_string()
            }
        );
    }

    #[test]
    fn read_only_ledger_never_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SEEN_LEDGER_FILE);

        let ledger = SeenLedger::read_only(&path).unwrap();
        assert_eq!(ledger.claim("h1", "a.csv"), Claim::Fresh);
        ledger.commit("h1").unwrap();

        assert!(!path.exists());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn malformed_line_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SEEN_LEDGER_FILE);
        fs::write(&path, "{\"sha256\":\"h1\",\"file_name\":\"a\",\"first_seen\":\"x\"}\nnot json\n")
            .unwrap();

        assert!(matches!(
            SeenLedger::open(&path),
            Err(OutputError::Decode { line: 2, .. })
        ));
    }
}
