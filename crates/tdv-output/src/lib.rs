//! File disposition for the trial data validator.
//!
//! - [`Disposer`]: archive valid files, log and move rejected ones
//! - [`ViolationLog`]: JSON-lines sink with one entry per rejected file
//! - [`SeenLedger`]: hashes of archived content for duplicate detection
//! - [`destination`]: collision-safe naming and moves

pub mod destination;
mod disposition;
mod error;
mod ledger;
mod log;

pub use destination::{Reservation, candidate_name, move_into, partition_dir};
pub use disposition::{Disposer, Disposition, DispositionConfig};
pub use error::{OutputError, Result};
pub use ledger::{Claim, SEEN_LEDGER_FILE, SeenEntry, SeenLedger};
pub use log::{LogEntry, VIOLATION_LOG_FILE, ViolationLog, read_log};
