//! File validation engine.
//!
//! Runs the stages for one file in a fixed order: file rules, parsing,
//! record rules row by row, then the uniqueness check for the same row.
//! Any file rule failure stops the file before parsing.

use std::path::Path;
use std::time::Instant;

use chrono::NaiveDateTime;
use tracing::debug;

use tdv_ingest::RecordReader;
use tdv_model::{FileVerdict, RuleCode, Schema, Violation};

use crate::checks::{FilenameCheck, UniqueTracker, duplicate_file, empty_file};
use crate::rules::RuleSet;

/// Facts about a file that the engine cannot derive from its bytes alone.
#[derive(Debug, Clone, Default)]
pub struct FileContext {
    /// Content hash of the file.
    pub sha256: String,
    /// Name under which identical content was already archived.
    pub duplicate_of: Option<String>,
}

impl FileContext {
    pub fn new(sha256: impl Into<String>) -> Self {
        Self {
            sha256: sha256.into(),
            duplicate_of: None,
        }
    }

    #[must_use]
    pub fn with_duplicate_of(mut self, file_name: impl Into<String>) -> Self {
        self.duplicate_of = Some(file_name.into());
        self
    }
}

/// Validator built once per batch and shared read-only across workers.
#[derive(Debug)]
pub struct Validator {
    schema: Schema,
    rules: RuleSet,
    filename: Option<FilenameCheck>,
}

impl Validator {
    /// Build the rule set for a schema. Fails when the schema is inconsistent.
    pub fn new(schema: Schema) -> tdv_model::Result<Self> {
        let rules = RuleSet::from_schema(&schema)?;
        let filename = schema
            .filename_pattern
            .as_deref()
            .map(FilenameCheck::new)
            .transpose()?;
        Ok(Self {
            schema,
            rules,
            filename,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Timestamp embedded in a conforming file name, if the schema defines one.
    pub fn filename_timestamp(&self, file_name: &str) -> Option<NaiveDateTime> {
        self.filename.as_ref()?.timestamp(file_name)
    }

    /// Validate one file's content and return its verdict.
    pub fn validate_file(&self, path: &Path, bytes: &[u8], context: &FileContext) -> FileVerdict {
        let started = Instant::now();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let file_violations = self.file_rules(&file_name, bytes, context);
        if !file_violations.is_empty() {
            debug!(
                file = %file_name,
                violations = file_violations.len(),
                "file rules failed"
            );
            return FileVerdict::new(path.to_path_buf(), 0, file_violations);
        }

        let (total_records, violations) = match self.record_rules(bytes) {
            Ok(result) => result,
            Err((read, error)) => {
                debug!(file = %file_name, error = %error, "parse failed");
                let violation = Violation::file(RuleCode::ParseError, error.to_string());
                (read, vec![violation])
            }
        };

        debug!(
            file = %file_name,
            records = total_records,
            violations = violations.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "validated"
        );
        FileVerdict::new(path.to_path_buf(), total_records, violations)
    }

    fn file_rules(&self, file_name: &str, bytes: &[u8], context: &FileContext) -> Vec<Violation> {
        let mut violations = Vec::new();
        if let Some(check) = &self.filename {
            violations.extend(check.check(file_name));
        }
        violations.extend(empty_file(bytes));
        violations.extend(duplicate_file(
            &context.sha256,
            context.duplicate_of.as_deref(),
        ));
        violations
    }

    /// Parse and evaluate every record. On a parse error, returns the number
    /// of records read before it and the error; record violations are dropped.
    fn record_rules(
        &self,
        bytes: &[u8],
    ) -> Result<(usize, Vec<Violation>), (usize, tdv_ingest::ParseError)> {
        let reader = RecordReader::from_bytes(bytes, &self.schema).map_err(|error| (0, error))?;
        let mut unique = UniqueTracker::new(&self.schema.unique);
        let mut violations = Vec::new();
        let mut total = 0;

        for record in reader {
            let record = record.map_err(|error| (total, error))?;
            violations.extend(self.rules.evaluate(&record));
            if !unique.is_empty() {
                violations.extend(unique.observe(&record));
            }
            total += 1;
        }

        Ok((total, violations))
    }
}
