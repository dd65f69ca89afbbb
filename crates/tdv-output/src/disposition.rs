//! Terminal placement of validated files.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::info;

use tdv_model::{FileVerdict, Outcome};

use crate::destination::{Reservation, partition_dir};
use crate::error::Result;
use crate::log::{LogEntry, ViolationLog};

/// Where dispositioned files go.
#[derive(Debug, Clone)]
pub struct DispositionConfig {
    pub archive_dir: PathBuf,
    pub rejected_dir: PathBuf,
    /// Place files under `YYYY/MM/DD` subdirectories.
    pub partition_by_date: bool,
    /// Report only: nothing is moved or logged.
    pub dry_run: bool,
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disposition {
    pub outcome: Outcome,
    /// Final location; `None` on a dry run.
    pub destination: Option<PathBuf>,
}

/// Moves files to archive or rejected, logging every rejection first.
#[derive(Debug)]
pub struct Disposer {
    config: DispositionConfig,
    log: Option<ViolationLog>,
}

impl Disposer {
    /// `log` may be `None` only for dry runs.
    pub fn new(config: DispositionConfig, log: Option<ViolationLog>) -> Self {
        Self { config, log }
    }

    pub fn config(&self) -> &DispositionConfig {
        &self.config
    }

    /// Place the file described by `verdict`.
    ///
    /// Valid files are archived under their own name. Rejected files get a
    /// reserved destination, then the log entry, then the move; a failure
    /// between the last two leaves the file in place with its violations
    /// already recorded. `filename_date` partitions the archive when set.
    pub fn dispose(
        &self,
        verdict: &FileVerdict,
        sha256: &str,
        filename_date: Option<NaiveDate>,
    ) -> Result<Disposition> {
        let outcome = verdict.outcome();
        if self.config.dry_run {
            return Ok(Disposition {
                outcome,
                destination: None,
            });
        }

        let source = verdict.source_path();
        let file_name = verdict.file_name();
        let today = Local::now().date_naive();

        let destination = match outcome {
            Outcome::Valid => {
                let dir = self.target_dir(&self.config.archive_dir, filename_date.unwrap_or(today));
                let destination = Reservation::acquire(&dir, &file_name)?.fill_with(source)?;
                info!(file = %file_name, to = %destination.display(), "archived");
                destination
            }
            Outcome::Rejected => {
                let dir = self.target_dir(&self.config.rejected_dir, today);
                let reservation = Reservation::acquire(&dir, &file_name)?;
                if let Some(log) = &self.log {
                    log.append(&LogEntry::for_verdict(verdict, sha256, reservation.path()))?;
                }
                let destination = reservation.fill_with(source)?;
                info!(
                    file = %file_name,
                    to = %destination.display(),
                    violations = verdict.violations().len(),
                    "rejected"
                );
                destination
            }
        };

        Ok(Disposition {
            outcome,
            destination: Some(destination),
        })
    }

    fn target_dir(&self, base: &Path, date: NaiveDate) -> PathBuf {
        if self.config.partition_by_date {
            partition_dir(base, date)
        } else {
            base.to_path_buf()
        }
    }
}
