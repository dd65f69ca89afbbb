//! Cross-field temporal ordering.

use tdv_model::{Record, RuleCode, Violation};

use super::RecordRule;

/// Flags records whose `end` value is earlier than their `start` value.
///
/// Skipped when either side is missing or invalid.
#[derive(Debug, Clone)]
pub struct DateOrderRule {
    start: String,
    end: String,
}

impl DateOrderRule {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
        }
    }
}

impl RecordRule for DateOrderRule {
    fn code(&self) -> RuleCode {
        RuleCode::DateOrder
    }

    fn field(&self) -> &str {
        &self.end
    }

    fn check(&self, record: &Record) -> Option<Violation> {
        let start_value = record.value(&self.start)?;
        let end_value = record.value(&self.end)?;
        let start = start_value.as_datetime()?;
        let end = end_value.as_datetime()?;
        if end >= start {
            return None;
        }
        Some(Violation::record(
            self.code(),
            &self.end,
            record.index,
            format!(
                "{} {} is before {} {} (line {})",
                self.end, end_value, self.start, start_value, record.line
            ),
        ))
    }
}
