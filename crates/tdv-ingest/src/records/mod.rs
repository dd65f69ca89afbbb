//! CSV record reading.

mod header;
mod reader;

pub use header::{BoundColumn, CsvHeaders, normalize_header};
pub use reader::{RecordReader, read_records};
