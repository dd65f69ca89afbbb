//! Byte-to-text decoding for source files.
//!
//! UTF-8 (with or without BOM) is the default. UTF-16 files are accepted
//! when they carry a BOM, and a legacy single-byte encoding can be named in
//! the schema.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};

use crate::error::ParseError;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Resolve a WHATWG encoding label such as `latin1` or `windows-1252`.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, ParseError> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| ParseError::UnknownEncoding {
        label: label.to_string(),
    })
}

/// Decode raw file bytes into text.
///
/// A byte-order mark always wins over the configured label.
pub fn decode_bytes(bytes: &[u8], label: Option<&str>) -> Result<String, ParseError> {
    if let Some(rest) = bytes.strip_prefix(&UTF8_BOM) {
        return decode_utf8(rest);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return decode_with(UTF_16LE, rest);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return decode_with(UTF_16BE, rest);
    }
    match label {
        Some(label) => {
            let encoding = resolve_encoding(label)?;
            if encoding == encoding_rs::UTF_8 {
                decode_utf8(bytes)
            } else {
                decode_with(encoding, bytes)
            }
        }
        None => decode_utf8(bytes),
    }
}

fn decode_utf8(bytes: &[u8]) -> Result<String, ParseError> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.to_string()),
        Err(error) => Err(ParseError::Encoding {
            encoding: "UTF-8",
            detail: format!("invalid byte sequence at offset {}", error.valid_up_to()),
        }),
    }
}

fn decode_with(encoding: &'static Encoding, bytes: &[u8]) -> Result<String, ParseError> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| ParseError::Encoding {
            encoding: encoding.name(),
            detail: "malformed byte sequence".to_string(),
        })
}
