//! SHA256 content hashes.
//!
//! Used to recognise files whose exact content was already archived and to
//! stamp log entries.

use sha2::{Digest, Sha256};

/// SHA256 of an in-memory buffer as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
