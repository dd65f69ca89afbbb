//! Batch configuration and startup checks.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use tdv_model::{Schema, SchemaError};
use tdv_output::{SEEN_LEDGER_FILE, VIOLATION_LOG_FILE};

/// Problems that stop a batch before any file is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("incoming directory not found: {path}")]
    IncomingMissing { path: PathBuf },

    #[error("incoming path is not a directory: {path}")]
    IncomingNotDirectory { path: PathBuf },

    #[error("{role} directory must differ from the incoming directory: {path}")]
    SameAsIncoming { role: &'static str, path: PathBuf },

    #[error("failed to create {role} directory {path}: {source}")]
    CreateDirectory {
        role: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("workers must be at least 1")]
    NoWorkers,

    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),
}

/// Everything one batch run needs.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub incoming_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub rejected_dir: PathBuf,
    pub log_dir: PathBuf,
    pub workers: usize,
    pub schema: Schema,
    pub dry_run: bool,
    /// Reject files whose content was already archived.
    pub dedupe: bool,
    pub partition_by_date: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            incoming_dir: PathBuf::from("data/incoming"),
            archive_dir: PathBuf::from("data/archive"),
            rejected_dir: PathBuf::from("data/rejected"),
            log_dir: PathBuf::from("logs"),
            workers: 1,
            schema: Schema::default_med_data(),
            dry_run: false,
            dedupe: true,
            partition_by_date: false,
        }
    }
}

impl BatchConfig {
    /// Config rooted at `root`: `root/incoming`, `root/archive`,
    /// `root/rejected`, `root/logs`.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            incoming_dir: root.join("incoming"),
            archive_dir: root.join("archive"),
            rejected_dir: root.join("rejected"),
            log_dir: root.join("logs"),
            ..Self::default()
        }
    }

    pub fn violation_log_path(&self) -> PathBuf {
        self.log_dir.join(VIOLATION_LOG_FILE)
    }

    pub fn seen_ledger_path(&self) -> PathBuf {
        self.log_dir.join(SEEN_LEDGER_FILE)
    }

    /// Check the configuration and create the output directories.
    ///
    /// A dry run creates nothing.
    pub fn prepare(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        self.schema.validate()?;

        if !self.incoming_dir.exists() {
            return Err(ConfigError::IncomingMissing {
                path: self.incoming_dir.clone(),
            });
        }
        if !self.incoming_dir.is_dir() {
            return Err(ConfigError::IncomingNotDirectory {
                path: self.incoming_dir.clone(),
            });
        }

        let outputs = [
            ("archive", &self.archive_dir),
            ("rejected", &self.rejected_dir),
            ("log", &self.log_dir),
        ];
        for (role, path) in outputs {
            if !self.dry_run {
                fs::create_dir_all(path).map_err(|source| ConfigError::CreateDirectory {
                    role,
                    path: path.clone(),
                    source,
                })?;
            }
            if role != "log" && same_location(&self.incoming_dir, path) {
                return Err(ConfigError::SameAsIncoming {
                    role,
                    path: path.clone(),
                });
            }
        }
        Ok(())
    }
}

fn same_location(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
