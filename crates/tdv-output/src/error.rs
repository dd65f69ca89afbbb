//! Disposition error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while moving files or appending to the batch sinks.
#[derive(Debug, Error)]
pub enum OutputError {
    /// File system operation failed.
    #[error("failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Moving a file into its terminal directory failed.
    #[error("failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No free destination name was found.
    #[error("no free name for {file_name} in {dir}")]
    NameExhausted { dir: PathBuf, file_name: String },

    /// A log entry could not be encoded.
    #[error("failed to encode log entry: {0}")]
    Encode(#[from] serde_json::Error),

    /// A line of a JSON-lines file could not be decoded.
    #[error("{path} line {line}: {message}")]
    Decode {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

impl OutputError {
    pub(crate) fn io(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, OutputError>;
