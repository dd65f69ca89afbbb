//! Checks that look beyond a single record.
//!
//! - [`file`]: decisions made from the file name, size and content hash
//!   before any parsing happens
//! - [`unique`]: cross-record uniqueness of declared key columns

pub mod file;
pub mod unique;

pub use file::{FilenameCheck, duplicate_file, empty_file};
pub use unique::UniqueTracker;
