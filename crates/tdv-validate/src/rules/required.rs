//! Presence check for required columns.

use tdv_model::{Record, RuleCode, Violation};

use super::RecordRule;

/// Flags a required column that is empty or absent.
#[derive(Debug, Clone)]
pub struct RequiredRule {
    field: String,
}

impl RequiredRule {
    pub fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
        }
    }
}

impl RecordRule for RequiredRule {
    fn code(&self) -> RuleCode {
        RuleCode::RequiredField
    }

    fn field(&self) -> &str {
        &self.field
    }

    fn check(&self, record: &Record) -> Option<Violation> {
        if !record.cell(&self.field).is_missing() {
            return None;
        }
        Some(Violation::record(
            self.code(),
            &self.field,
            record.index,
            format!("{} is required (line {})", self.field, record.line),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdv_model::{Cell, Value};

    #[test]
    fn missing_and_absent_cells_are_flagged() {
        let rule = RequiredRule::new("batch_id");

        let empty = Record::new(3, 5).with_cell("batch_id", Cell::Missing);
        let violation = rule.check(&empty).unwrap();
        assert_eq!(violation.rule_code, RuleCode::RequiredField);
        assert_eq!(violation.field_name.as_deref(), Some("batch_id"));
        assert_eq!(violation.record_index, Some(3));

        let absent = Record::new(0, 2);
        assert!(rule.check(&absent).is_some());
    }

    #[test]
    fn present_values_pass() {
        let rule = RequiredRule::new("batch_id");
        let record = Record::new(0, 2).with_cell("batch_id", Cell::Valid(Value::Integer(7)));
        assert!(rule.check(&record).is_none());
    }

    #[test]
    fn invalid_values_count_as_present() {
        let rule = RequiredRule::new("batch_id");
        let record = Record::new(0, 2).with_cell(
            "batch_id",
            Cell::Invalid {
                raw: "x".to_string(),
                expected: tdv_model::ColumnType::Integer,
            },
        );
        assert!(rule.check(&record).is_none());
    }
}
