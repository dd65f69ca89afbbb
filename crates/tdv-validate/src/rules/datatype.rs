//! Type conformance check.
//!
//! Coercion happens once in the reader; this rule reports the cells that
//! did not coerce.

use tdv_model::{Cell, ColumnType, Record, RuleCode, Violation};

use super::RecordRule;

/// Flags a cell whose raw text is not a valid value of the column type.
#[derive(Debug, Clone)]
pub struct TypeRule {
    field: String,
    expected: ColumnType,
}

impl TypeRule {
    pub fn new(field: &str, expected: ColumnType) -> Self {
        Self {
            field: field.to_string(),
            expected,
        }
    }
}

impl RecordRule for TypeRule {
    fn code(&self) -> RuleCode {
        RuleCode::InvalidType
    }

    fn field(&self) -> &str {
        &self.field
    }

    fn check(&self, record: &Record) -> Option<Violation> {
        let Cell::Invalid { raw, .. } = record.cell(&self.field) else {
            return None;
        };
        Some(Violation::record(
            self.code(),
            &self.field,
            record.index,
            format!(
                "{} value '{}' is not a valid {} (line {})",
                self.field, raw, self.expected, record.line
            ),
        ))
    }
}
