//! Violations and per-file verdicts.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Stable identifier of a validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCode {
    // File-level
    FilenameFormat,
    EmptyFile,
    DuplicateFile,
    ParseError,
    ProcessingError,
    // Record-level
    RequiredField,
    InvalidType,
    OutOfRange,
    PatternMismatch,
    DateOrder,
    // Cross-record
    DuplicateValue,
}

impl RuleCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCode::FilenameFormat => "filename_format",
            RuleCode::EmptyFile => "empty_file",
            RuleCode::DuplicateFile => "duplicate_file",
            RuleCode::ParseError => "parse_error",
            RuleCode::ProcessingError => "processing_error",
            RuleCode::RequiredField => "required_field",
            RuleCode::InvalidType => "invalid_type",
            RuleCode::OutOfRange => "out_of_range",
            RuleCode::PatternMismatch => "pattern_mismatch",
            RuleCode::DateOrder => "date_order",
            RuleCode::DuplicateValue => "duplicate_value",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            RuleCode::FilenameFormat
            | RuleCode::EmptyFile
            | RuleCode::DuplicateFile
            | RuleCode::ParseError
            | RuleCode::ProcessingError => Category::File,
            RuleCode::RequiredField => Category::Presence,
            RuleCode::InvalidType | RuleCode::PatternMismatch => Category::Format,
            RuleCode::OutOfRange => Category::Limit,
            RuleCode::DateOrder | RuleCode::DuplicateValue => Category::Consistency,
        }
    }
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grouping of rules for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    File,
    Presence,
    Format,
    Limit,
    Consistency,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::File => "File",
            Category::Presence => "Presence",
            Category::Format => "Format",
            Category::Limit => "Limit",
            Category::Consistency => "Consistency",
        }
    }
}

/// One rule failure attributed to a field and/or record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub rule_code: RuleCode,
    pub category: Category,
    pub field_name: Option<String>,
    /// 0-based data row; `None` for file-level violations.
    pub record_index: Option<usize>,
    pub message: String,
}

impl Violation {
    /// Violation attributed to a single record.
    pub fn record(
        rule_code: RuleCode,
        field_name: impl Into<String>,
        record_index: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_code,
            category: rule_code.category(),
            field_name: Some(field_name.into()),
            record_index: Some(record_index),
            message: message.into(),
        }
    }

    /// Violation attributed to the whole file.
    pub fn file(rule_code: RuleCode, message: impl Into<String>) -> Self {
        Self {
            rule_code,
            category: rule_code.category(),
            field_name: None,
            record_index: None,
            message: message.into(),
        }
    }

    pub fn is_file_level(&self) -> bool {
        self.record_index.is_none()
    }
}

/// Terminal decision for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Valid,
    Rejected,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Valid => "Valid",
            Outcome::Rejected => "Rejected",
        }
    }
}

/// Aggregated validity decision for one source file.
///
/// The outcome is derived from the violations at construction and the value
/// is never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileVerdict {
    source_path: PathBuf,
    total_records: usize,
    violations: Vec<Violation>,
    outcome: Outcome,
}

impl FileVerdict {
    pub fn new(source_path: PathBuf, total_records: usize, violations: Vec<Violation>) -> Self {
        let outcome = if violations.is_empty() {
            Outcome::Valid
        } else {
            Outcome::Rejected
        };
        Self {
            source_path,
            total_records,
            violations,
            outcome,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// File name component of the source path, lossily converted.
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn total_records(&self) -> usize {
        self.total_records
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_valid(&self) -> bool {
        self.outcome == Outcome::Valid
    }

    /// Number of distinct records with at least one violation.
    pub fn rejected_record_count(&self) -> usize {
        let mut indices: Vec<usize> = self
            .violations
            .iter()
            .filter_map(|violation| violation.record_index)
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices.len()
    }
}
