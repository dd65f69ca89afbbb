//! Batch driver: enumerate incoming files and run each through
//! hash → claim → validate → dispose.
//!
//! With more than one worker, a scoped pool pulls the next file index from a
//! shared counter. Reports come back in file order either way.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span, warn};

use tdv_ingest::{list_incoming_files, read_source_bytes, sha256_hex};
use tdv_model::{FileVerdict, Outcome};
use tdv_output::{Claim, Disposer, Disposition, DispositionConfig, SeenLedger, ViolationLog};
use tdv_validate::{FileContext, Validator};

use crate::config::BatchConfig;
use crate::logging::redact_value;
use crate::types::{BatchSummary, FileReport, FileStatus};

/// Shared cancellation request, checked before each file is started.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Read-only state shared by all workers for one batch.
struct BatchContext {
    validator: Validator,
    disposer: Disposer,
    ledger: Option<SeenLedger>,
}

/// Run one batch over the incoming directory.
///
/// Startup problems surface as [`crate::config::ConfigError`] inside the
/// returned error. Per-file failures never abort the batch.
pub fn run_batch(config: &BatchConfig, cancel: &CancelFlag) -> Result<BatchSummary> {
    config.prepare()?;
    let validator = Validator::new(config.schema.clone())
        .map_err(crate::config::ConfigError::from)?;

    let span = info_span!(
        "batch",
        incoming = %config.incoming_dir.display(),
        workers = config.workers
    );
    let _guard = span.enter();
    let started = Instant::now();

    let files = list_incoming_files(&config.incoming_dir).context("list incoming files")?;
    if files.is_empty() {
        info!("no files to process");
        return Ok(BatchSummary::from_reports(Vec::new(), 0, config.dry_run));
    }

    let log = if config.dry_run {
        None
    } else {
        Some(ViolationLog::open(&config.violation_log_path()).context("open violation log")?)
    };
    let ledger = match (config.dedupe, config.dry_run) {
        (false, _) => None,
        (true, true) => Some(SeenLedger::read_only(&config.seen_ledger_path())?),
        (true, false) => Some(SeenLedger::open(&config.seen_ledger_path())?),
    };
    let disposer = Disposer::new(
        DispositionConfig {
            archive_dir: config.archive_dir.clone(),
            rejected_dir: config.rejected_dir.clone(),
            partition_by_date: config.partition_by_date,
            dry_run: config.dry_run,
        },
        log,
    );
    let context = BatchContext {
        validator,
        disposer,
        ledger,
    };

    info!(files = files.len(), "batch started");
    let results = if config.workers <= 1 || files.len() == 1 {
        run_sequential(&context, &files, cancel)
    } else {
        run_parallel(&context, &files, config.workers, cancel)
    };

    let skipped = results.iter().filter(|result| result.is_none()).count();
    let reports: Vec<FileReport> = results.into_iter().flatten().collect();
    let summary = BatchSummary::from_reports(reports, skipped, config.dry_run);
    if skipped > 0 {
        warn!(skipped, "batch cancelled, remaining files left in incoming");
    }
    info!(
        validated = summary.validated,
        rejected = summary.rejected,
        errored = summary.errored,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "batch finished"
    );
    Ok(summary)
}

fn run_sequential(
    context: &BatchContext,
    files: &[PathBuf],
    cancel: &CancelFlag,
) -> Vec<Option<FileReport>> {
    let mut results = Vec::with_capacity(files.len());
    for path in files {
        if cancel.is_cancelled() {
            results.push(None);
            continue;
        }
        results.push(Some(process_file(context, path)));
    }
    results
}

fn run_parallel(
    context: &BatchContext,
    files: &[PathBuf],
    workers: usize,
    cancel: &CancelFlag,
) -> Vec<Option<FileReport>> {
    let next = AtomicUsize::new(0);
    let mut results: Vec<Option<FileReport>> = vec![None; files.len()];

    let collected: Vec<Vec<(usize, FileReport)>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers.min(files.len()))
            .map(|_| {
                scope.spawn(|| {
                    let mut done = Vec::new();
                    loop {
                        if cancel.is_cancelled() {
                            break;
                        }
                        let index = next.fetch_add(1, Ordering::SeqCst);
                        let Some(path) = files.get(index) else {
                            break;
                        };
                        done.push((index, process_file(context, path)));
                    }
                    done
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_default())
            .collect()
    });

    for (index, report) in collected.into_iter().flatten() {
        results[index] = Some(report);
    }
    results
}

/// Process one file; never fails, errors become an `Errored` report.
fn process_file(context: &BatchContext, path: &Path) -> FileReport {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let span = info_span!("process_file", file = %file_name);
    let _guard = span.enter();

    let bytes = match read_source_bytes(path) {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!(%error, "read failed, file left in incoming");
            return FileReport::errored(path.to_path_buf(), error.to_string());
        }
    };
    let sha256 = sha256_hex(&bytes);

    let mut file_context = FileContext::new(&sha256);
    let mut claimed = false;
    if let Some(ledger) = &context.ledger {
        match ledger.claim(&sha256, &file_name) {
            Claim::Fresh => claimed = true,
            Claim::Seen { file_name: original } => {
                file_context = file_context.with_duplicate_of(original);
            }
        }
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let verdict = context.validator.validate_file(path, &bytes, &file_context);
        let filename_date = context
            .validator
            .filename_timestamp(&file_name)
            .map(|stamp| stamp.date());
        let disposition = context.disposer.dispose(&verdict, &sha256, filename_date);
        (verdict, disposition)
    }));

    match outcome {
        Ok((verdict, Ok(disposition))) => {
            if claimed {
                settle_claim(context, &sha256, disposition.outcome);
            }
            report_for(&verdict, disposition)
        }
        Ok((_, Err(error))) => {
            warn!(%error, "disposition failed, file left in incoming");
            release_claim(context, &sha256, claimed);
            FileReport::errored(path.to_path_buf(), error.to_string())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(panic = %message, "processing panicked, file left in incoming");
            release_claim(context, &sha256, claimed);
            FileReport::errored(path.to_path_buf(), format!("processing panicked: {message}"))
        }
    }
}

fn settle_claim(context: &BatchContext, sha256: &str, outcome: Outcome) {
    let Some(ledger) = &context.ledger else {
        return;
    };
    match outcome {
        Outcome::Valid => {
            if let Err(error) = ledger.commit(sha256) {
                warn!(%error, "archived file not recorded in seen ledger");
            }
        }
        Outcome::Rejected => ledger.release(sha256),
    }
}

fn release_claim(context: &BatchContext, sha256: &str, claimed: bool) {
    if let (true, Some(ledger)) = (claimed, &context.ledger) {
        ledger.release(sha256);
    }
}

fn report_for(verdict: &FileVerdict, disposition: Disposition) -> FileReport {
    for violation in verdict.violations() {
        debug!(
            rule = %violation.rule_code,
            field = violation.field_name.as_deref().unwrap_or("-"),
            record = ?violation.record_index,
            detail = redact_value(&violation.message),
            "violation"
        );
    }
    FileReport {
        file_name: verdict.file_name(),
        source_path: verdict.source_path().to_path_buf(),
        status: match disposition.outcome {
            Outcome::Valid => FileStatus::Archived,
            Outcome::Rejected => FileStatus::Rejected,
        },
        total_records: verdict.total_records(),
        violations: verdict.violations().to_vec(),
        destination: disposition.destination,
        error: None,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_cancelled());
        flag.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn panic_messages_are_extracted() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");

        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
