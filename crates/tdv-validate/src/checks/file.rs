//! File-level rules evaluated before the content is parsed.

use chrono::NaiveDateTime;
use regex::Regex;
use tdv_model::{RuleCode, SchemaError, Violation};

/// Format of a 14-digit timestamp embedded in a file name.
const FILENAME_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Compiled file-name convention.
///
/// When the pattern has a capture group holding 14 digits, the capture must
/// also be a real calendar timestamp.
#[derive(Debug, Clone)]
pub struct FilenameCheck {
    pattern: String,
    regex: Regex,
}

impl FilenameCheck {
    pub fn new(pattern: &str) -> Result<Self, SchemaError> {
        let regex = Regex::new(pattern).map_err(|error| SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            message: error.to_string(),
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Check a bare file name.
    pub fn check(&self, file_name: &str) -> Option<Violation> {
        let Some(captures) = self.regex.captures(file_name) else {
            return Some(Violation::file(
                RuleCode::FilenameFormat,
                format!(
                    "invalid filename format: '{file_name}' does not match '{}'",
                    self.pattern
                ),
            ));
        };

        let stamp = captures.get(1)?.as_str();
        if !is_timestamp_digits(stamp) {
            return None;
        }
        match NaiveDateTime::parse_from_str(stamp, FILENAME_TIMESTAMP_FORMAT) {
            Ok(_) => None,
            Err(_) => Some(Violation::file(
                RuleCode::FilenameFormat,
                format!("invalid datetime in filename: '{stamp}'"),
            )),
        }
    }

    /// Timestamp captured from a conforming file name.
    pub fn timestamp(&self, file_name: &str) -> Option<NaiveDateTime> {
        let captures = self.regex.captures(file_name)?;
        let stamp = captures.get(1)?.as_str();
        if !is_timestamp_digits(stamp) {
            return None;
        }
        NaiveDateTime::parse_from_str(stamp, FILENAME_TIMESTAMP_FORMAT).ok()
    }
}

fn is_timestamp_digits(text: &str) -> bool {
    text.len() == 14 && text.bytes().all(|b| b.is_ascii_digit())
}

/// Zero-byte files are rejected without parsing.
pub fn empty_file(bytes: &[u8]) -> Option<Violation> {
    bytes
        .is_empty()
        .then(|| Violation::file(RuleCode::EmptyFile, "file is empty"))
}

/// Content already archived under another name.
pub fn duplicate_file(sha256: &str, duplicate_of: Option<&str>) -> Option<Violation> {
    duplicate_of.map(|original| {
        Violation::file(
            RuleCode::DuplicateFile,
            format!("duplicate file (sha256 {sha256}) already archived as '{original}'"),
        )
    })
}
