//! Data model for the trial data validator.
//!
//! - [`Schema`]: typed descriptor of the expected columns
//! - [`Record`]: one parsed row with coerced [`Cell`] values
//! - [`Violation`]: one rule failure
//! - [`FileVerdict`]: aggregated decision for one file

pub mod error;
pub mod record;
pub mod schema;
pub mod verdict;

pub use error::{Result, SchemaError};
pub use record::{Cell, Record, Value};
pub use schema::{ColumnSpec, ColumnType, DateOrderSpec, Schema};
pub use verdict::{Category, FileVerdict, Outcome, RuleCode, Violation};
