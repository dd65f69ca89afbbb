use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or checking a schema descriptor.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("schema declares no columns")]
    NoColumns,

    #[error("schema column name is empty at position {position}")]
    EmptyColumnName { position: usize },

    #[error("column '{column}' is declared more than once")]
    DuplicateColumn { column: String },

    #[error("{context} references unknown column '{column}'")]
    UnknownColumn { context: &'static str, column: String },

    #[error("date order constraint uses non-temporal column '{column}'")]
    NotTemporal { column: String },

    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("delimiter '{delimiter}' must be a single ASCII character")]
    InvalidDelimiter { delimiter: char },

    #[error("column '{column}': {reason}")]
    InvalidColumn { column: String, reason: String },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
