//! Numeric bounds check.

use tdv_model::{ColumnSpec, Record, RuleCode, Violation};

use super::RecordRule;

/// Flags numeric values below `min`, above `max`, or at/above `max_exclusive`.
///
/// Non-numeric, missing and invalid cells are left to the other rules.
#[derive(Debug, Clone)]
pub struct RangeRule {
    field: String,
    min: Option<f64>,
    max: Option<f64>,
    max_exclusive: Option<f64>,
}

impl RangeRule {
    pub fn from_column(column: &ColumnSpec) -> Self {
        Self {
            field: column.name.clone(),
            min: column.min,
            max: column.max,
            max_exclusive: column.max_exclusive,
        }
    }

    fn describe_bounds(&self) -> String {
        let lower = self.min.map(|min| format!(">= {min}"));
        let upper = match (self.max, self.max_exclusive) {
            (_, Some(limit)) if self.max.is_none_or(|max| limit <= max) => {
                Some(format!("< {limit}"))
            }
            (Some(max), _) => Some(format!("<= {max}")),
            (None, _) => None,
        };
        [lower, upper]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" and ")
    }

    fn in_range(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min)
            && self.max.is_none_or(|max| value <= max)
            && self.max_exclusive.is_none_or(|limit| value < limit)
    }
}

impl RecordRule for RangeRule {
    fn code(&self) -> RuleCode {
        RuleCode::OutOfRange
    }

    fn field(&self) -> &str {
        &self.field
    }

    fn check(&self, record: &Record) -> Option<Violation> {
        let value = record.value(&self.field)?;
        let number = value.as_f64()?;
        if self.in_range(number) {
            return None;
        }
        Some(Violation::record(
            self.code(),
            &self.field,
            record.index,
            format!(
                "{} out of range: {} (expected {}, line {})",
                self.field,
                value,
                self.describe_bounds(),
                record.line
            ),
        ))
    }
}
