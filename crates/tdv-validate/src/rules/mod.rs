//! Record-level validation rules.
//!
//! Each rule is a pure function of one [`Record`]: it yields at most one
//! [`Violation`] per call and never looks at other records. Rules are built
//! once from the schema and shared read-only across files and threads.

mod datatype;
mod date_order;
mod pattern;
mod range;
mod required;

use std::fmt;

use tdv_model::{Record, RuleCode, Schema, Violation};

pub use datatype::TypeRule;
pub use date_order::DateOrderRule;
pub use pattern::PatternRule;
pub use range::RangeRule;
pub use required::RequiredRule;

/// A deterministic check over one record.
pub trait RecordRule: fmt::Debug + Send + Sync {
    /// Stable rule identifier.
    fn code(&self) -> RuleCode;

    /// Column the rule reports against.
    fn field(&self) -> &str;

    /// Evaluate the rule. Returns `None` when the record passes.
    fn check(&self, record: &Record) -> Option<Violation>;
}

/// Ordered, immutable collection of record rules.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn RecordRule>>,
}

impl RuleSet {
    /// Instantiate rules in declaration order.
    ///
    /// For each column in schema order: presence, type, range, pattern.
    /// Cross-field date-order rules follow the column rules. The schema is
    /// checked first.
    pub fn from_schema(schema: &Schema) -> tdv_model::Result<Self> {
        schema.validate()?;
        let mut rules: Vec<Box<dyn RecordRule>> = Vec::new();

        for column in &schema.columns {
            if column.required {
                rules.push(Box::new(RequiredRule::new(&column.name)));
            }
            rules.push(Box::new(TypeRule::new(&column.name, column.column_type)));
            if column.has_bounds() {
                rules.push(Box::new(RangeRule::from_column(column)));
            }
            if let Some(pattern) = &column.pattern {
                rules.push(Box::new(PatternRule::new(&column.name, pattern)?));
            }
        }

        for order in &schema.date_order {
            rules.push(Box::new(DateOrderRule::new(&order.start, &order.end)));
        }

        Ok(Self { rules })
    }

    /// Run every rule against the record, in declaration order.
    pub fn evaluate(&self, record: &Record) -> Vec<Violation> {
        self.rules
            .iter()
            .filter_map(|rule| rule.check(record))
            .collect()
    }

    /// Number of rules in the set.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over all rules.
    pub fn iter(&self) -> impl Iterator<Item = &dyn RecordRule> {
        self.rules.iter().map(AsRef::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdv_model::{ColumnSpec, ColumnType};

    #[test]
    fn rules_follow_declaration_order() {
        let schema = Schema::new(
            "visits",
            vec![
                ColumnSpec::new("id", ColumnType::Integer)
                    .required()
                    .with_min(1.0),
                ColumnSpec::new("site", ColumnType::Text).with_pattern("^[A-Z]{3}$"),
                ColumnSpec::new("start_date", ColumnType::Date),
                ColumnSpec::new("end_date", ColumnType::Date),
            ],
        )
        .with_date_order("start_date", "end_date");

        let rules = RuleSet::from_schema(&schema).unwrap();
        let order: Vec<(RuleCode, &str)> =
            rules.iter().map(|rule| (rule.code(), rule.field())).collect();
        assert_eq!(
            order,
            vec![
                (RuleCode::RequiredField, "id"),
                (RuleCode::InvalidType, "id"),
                (RuleCode::OutOfRange, "id"),
                (RuleCode::InvalidType, "site"),
                (RuleCode::PatternMismatch, "site"),
                (RuleCode::InvalidType, "start_date"),
                (RuleCode::InvalidType, "end_date"),
                (RuleCode::DateOrder, "end_date"),
            ]
        );
    }
}
