//! Trial data ingestion utilities.
//!
//! This crate turns the raw bytes of an incoming file into a lazy stream of
//! typed [`tdv_model::Record`]s, and finds the files waiting to be processed.
//!
//! # Features
//!
//! - **Decoding**: UTF-8 (BOM tolerated), UTF-16 with BOM, configured legacy encodings
//! - **CSV Parsing**: header bound to the schema, typed coercion per column
//! - **Discovery**: stable, lexicographic listing of the incoming directory
//! - **Checksums**: SHA256 content hashes
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use tdv_ingest::{RecordReader, list_incoming_files, read_source_bytes};
//! use tdv_model::Schema;
//!
//! let schema = Schema::default_med_data();
//! for path in list_incoming_files(Path::new("data/incoming"))? {
//!     let bytes = read_source_bytes(&path)?;
//!     for record in RecordReader::from_bytes(&bytes, &schema)? {
//!         let record = record?;
//!     }
//! }
//! ```

mod checksum;
mod coerce;
mod decode;
mod discovery;
mod error;
mod records;

// === Error Types ===
pub use error::{IngestError, ParseError, Result};

// === Decoding ===
pub use decode::{decode_bytes, resolve_encoding};

// === CSV Reading ===
pub use coerce::coerce;
pub use records::{BoundColumn, CsvHeaders, RecordReader, normalize_header, read_records};

// === File Discovery ===
pub use discovery::{list_incoming_files, read_source_bytes};

// === Checksums ===
pub use checksum::sha256_hex;
