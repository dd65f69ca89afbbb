use std::path::PathBuf;

use serde::Serialize;

use tdv_model::Violation;

/// Terminal state of one file in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Archived,
    Rejected,
    /// Left in incoming after an IO failure or panic.
    Errored,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file_name: String,
    pub source_path: PathBuf,
    pub status: FileStatus,
    pub total_records: usize,
    pub violations: Vec<Violation>,
    /// `None` on a dry run or when the file errored.
    pub destination: Option<PathBuf>,
    pub error: Option<String>,
}

impl FileReport {
    pub fn errored(source_path: PathBuf, error: String) -> Self {
        let file_name = source_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            file_name,
            source_path,
            status: FileStatus::Errored,
            total_records: 0,
            violations: Vec::new(),
            destination: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub validated: usize,
    pub rejected: usize,
    pub errored: usize,
    /// Files still in incoming because the batch was cancelled.
    pub skipped: usize,
    pub dry_run: bool,
    pub files: Vec<FileReport>,
}

impl BatchSummary {
    pub fn from_reports(files: Vec<FileReport>, skipped: usize, dry_run: bool) -> Self {
        let count = |status| files.iter().filter(|file| file.status == status).count();
        Self {
            validated: count(FileStatus::Archived),
            rejected: count(FileStatus::Rejected),
            errored: count(FileStatus::Errored),
            skipped,
            dry_run,
            files,
        }
    }

    pub fn total(&self) -> usize {
        self.validated + self.rejected + self.errored
    }
}
