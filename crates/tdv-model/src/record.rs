//! Parsed rows with values coerced to their declared column types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::schema::ColumnType;

/// A typed scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Numeric view used by range checks.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Comparable point in time. Dates map to midnight, times to
    /// the epoch day so that time-only columns still order correctly.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(date) => date.and_hms_opt(0, 0, 0),
            Value::Time(time) => Some(NaiveDateTime::new(NaiveDate::MIN, *time)),
            Value::DateTime(value) => Some(*value),
            _ => None,
        }
    }

    /// Canonical text used for uniqueness comparisons.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(value) => f.write_str(value),
            Value::Integer(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            Value::Time(value) => write!(f, "{}", value.format("%H:%M:%S")),
            Value::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

/// One field of a record after coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Empty after trimming.
    Missing,
    Valid(Value),
    /// Present but not parseable as the declared type.
    Invalid { raw: String, expected: ColumnType },
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Cell::Valid(value) => Some(value),
            _ => None,
        }
    }
}

/// One data row of a source file, keyed by declared column name.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 0-based position among the data rows.
    pub index: usize,
    /// 1-based physical line in the source (header is line 1).
    pub line: u64,
    pub cells: BTreeMap<String, Cell>,
}

impl Record {
    pub fn new(index: usize, line: u64) -> Self {
        Self {
            index,
            line,
            cells: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_cell(mut self, column: impl Into<String>, cell: Cell) -> Self {
        self.cells.insert(column.into(), cell);
        self
    }

    /// Cell for a declared column; columns absent from the record read as missing.
    pub fn cell(&self, column: &str) -> &Cell {
        self.cells.get(column).unwrap_or(&Cell::Missing)
    }

    pub fn value(&self, column: &str) -> Option<&Value> {
        self.cell(column).value()
    }
}
