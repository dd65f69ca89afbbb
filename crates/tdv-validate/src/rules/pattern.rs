//! Regular-expression check for column values.

use regex::Regex;
use tdv_model::{Record, RuleCode, SchemaError, Violation};

use super::RecordRule;

/// Flags values whose text does not fully match the column pattern.
#[derive(Debug, Clone)]
pub struct PatternRule {
    field: String,
    pattern: String,
    regex: Regex,
}

impl PatternRule {
    /// Compile the pattern, anchored at both ends.
    pub fn new(field: &str, pattern: &str) -> Result<Self, SchemaError> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|error| {
            SchemaError::InvalidPattern {
                pattern: pattern.to_string(),
                message: error.to_string(),
            }
        })?;
        Ok(Self {
            field: field.to_string(),
            pattern: pattern.to_string(),
            regex,
        })
    }
}

impl RecordRule for PatternRule {
    fn code(&self) -> RuleCode {
        RuleCode::PatternMismatch
    }

    fn field(&self) -> &str {
        &self.field
    }

    fn check(&self, record: &Record) -> Option<Violation> {
        let value = record.value(&self.field)?;
        let text = value.to_string();
        if self.regex.is_match(&text) {
            return None;
        }
        Some(Violation::record(
            self.code(),
            &self.field,
            record.index,
            format!(
                "{} value '{}' does not match pattern '{}' (line {})",
                self.field, text, self.pattern, record.line
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdv_model::{Cell, Value};

    fn site(text: &str) -> Record {
        Record::new(0, 2).with_cell("site", Cell::Valid(Value::Text(text.to_string())))
    }

    #[test]
    fn pattern_must_match_whole_value() {
        let rule = PatternRule::new("site", "[A-Z]{3}").unwrap();
        assert!(rule.check(&site("ABC")).is_none());
        assert!(rule.check(&site("ABCD")).is_some());
        assert!(rule.check(&site("xABC")).is_some());
    }

    #[test]
    fn invalid_pattern_is_a_schema_error() {
        let error = PatternRule::new("site", "[A-Z").unwrap_err();
        assert!(matches!(error, SchemaError::InvalidPattern { .. }));
    }
}
