//! Error types for trial data ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locating or reading source files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

/// File-level parse failures.
///
/// Any of these rejects the whole file without per-record evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    // === Decoding ===
    /// Bytes are not valid text in the expected encoding.
    #[error("file is not valid {encoding} text: {detail}")]
    Encoding {
        encoding: &'static str,
        detail: String,
    },

    /// Configured encoding label is not recognized.
    #[error("unknown encoding label '{label}'")]
    UnknownEncoding { label: String },

    // === Structure ===
    /// No header row.
    #[error("file has no header row")]
    Empty,

    /// Header does not list the declared columns in order.
    #[error("header mismatch: expected [{}], found [{}]", expected.join(", "), found.join(", "))]
    HeaderMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Declared columns absent from the header.
    #[error("header is missing declared columns: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    /// A header name appears more than once.
    #[error("header column '{column}' appears more than once")]
    DuplicateHeader { column: String },

    /// Row field count differs from the header.
    #[error("line {line}: expected {expected} fields, found {found}")]
    ColumnCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Any other CSV reader failure.
    #[error("CSV error{}: {message}", line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Csv { line: Option<u64>, message: String },
}

impl From<csv::Error> for ParseError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(csv::Position::line);
        match error.kind() {
            csv::ErrorKind::UnequalLengths {
                pos,
                expected_len,
                len,
            } => ParseError::ColumnCount {
                line: pos.as_ref().map(csv::Position::line).unwrap_or_default(),
                expected: *expected_len as usize,
                found: *len as usize,
            },
            csv::ErrorKind::Utf8 { err, .. } => ParseError::Encoding {
                encoding: "UTF-8",
                detail: err.to_string(),
            },
            _ => ParseError::Csv {
                line,
                message: error.to_string(),
            },
        }
    }
}
