//! Cross-record uniqueness of key columns.

use std::collections::HashMap;

use tdv_model::{Cell, Record, RuleCode, Violation};

/// Remembers the first record index of every key seen in a file.
///
/// Fed one record at a time in row order; every repeat after the first
/// occurrence is reported at the repeating record. Missing cells are not
/// keys.
#[derive(Debug, Default)]
pub struct UniqueTracker {
    columns: Vec<String>,
    seen: HashMap<(usize, String), usize>,
}

impl UniqueTracker {
    pub fn new(columns: &[String]) -> Self {
        Self {
            columns: columns.to_vec(),
            seen: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Record the keys of one row and return the duplicates it introduces.
    pub fn observe(&mut self, record: &Record) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (position, column) in self.columns.iter().enumerate() {
            let key = match record.cell(column) {
                Cell::Missing => continue,
                Cell::Valid(value) => value.key(),
                Cell::Invalid { raw, .. } => raw.clone(),
            };
            match self.seen.get(&(position, key.clone())) {
                Some(first) => violations.push(Violation::record(
                    RuleCode::DuplicateValue,
                    column,
                    record.index,
                    format!(
                        "duplicate {column}: {key} (first seen at record {first}, line {})",
                        record.line
                    ),
                )),
                None => {
                    self.seen.insert((position, key), record.index);
                }
            }
        }
        violations
    }
}
