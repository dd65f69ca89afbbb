//! Rule engine for trial data files.
//!
//! - [`rules`]: per-record rules built from the schema
//! - [`checks`]: file-level and cross-record checks
//! - [`Validator`]: runs every stage for one file and yields a
//!   [`tdv_model::FileVerdict`]

pub mod checks;
mod engine;
pub mod rules;

pub use engine::{FileContext, Validator};
pub use rules::{RecordRule, RuleSet};
