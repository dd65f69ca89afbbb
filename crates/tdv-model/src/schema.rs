//! Typed schema descriptor for incoming data files.
//!
//! A [`Schema`] lists the expected columns with their types and
//! constraints. It is checked once when loaded, then shared read-only by the
//! parser and the rule engine.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// Column data type used for coercion at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Integer,
    Float,
    Date,
    Time,
    #[serde(rename = "datetime")]
    DateTime,
}

impl ColumnType {
    /// Returns the lowercase name used in schema files and messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
            ColumnType::DateTime => "datetime",
        }
    }

    /// Default chrono format for temporal types.
    pub fn default_format(&self) -> Option<&'static str> {
        match self {
            ColumnType::Date => Some("%Y-%m-%d"),
            ColumnType::Time => Some("%H:%M:%S"),
            ColumnType::DateTime => Some("%Y-%m-%dT%H:%M:%S"),
            _ => None,
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            ColumnType::Date | ColumnType::Time | ColumnType::DateTime
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Empty values are violations when set.
    #[serde(default)]
    pub required: bool,
    /// Inclusive lower bound for numeric columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive upper bound for numeric columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Exclusive upper bound for numeric columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_exclusive: Option<f64>,
    /// Regular expression the full text value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// chrono format string for temporal columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            required: false,
            min: None,
            max: None,
            max_exclusive: None,
            pattern: None,
            format: None,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use]
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    #[must_use]
    pub fn with_max_exclusive(mut self, max: f64) -> Self {
        self.max_exclusive = Some(max);
        self
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Format used to parse temporal values, falling back to the type default.
    pub fn temporal_format(&self) -> Option<&str> {
        if !self.column_type.is_temporal() {
            return None;
        }
        self.format
            .as_deref()
            .or_else(|| self.column_type.default_format())
    }

    pub fn has_bounds(&self) -> bool {
        self.min.is_some() || self.max.is_some() || self.max_exclusive.is_some()
    }
}

/// Cross-field constraint: `end` must not be before `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOrderSpec {
    pub start: String,
    pub end: String,
}

impl DateOrderSpec {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

fn default_delimiter() -> char {
    ','
}

/// Declared layout and constraints of one family of input files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Encoding label (WHATWG name, e.g. `windows-1252`). UTF-8 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// Header must list exactly the declared columns, in order.
    #[serde(default)]
    pub strict_header: bool,
    /// Regex the file name must match. A 14-digit capture group is read as
    /// a `%Y%m%d%H%M%S` timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename_pattern: Option<String>,
    pub columns: Vec<ColumnSpec>,
    /// Columns whose values must not repeat within one file.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unique: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub date_order: Vec<DateOrderSpec>,
}

impl Schema {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSpec>) -> Self {
        Self {
            name: name.into(),
            delimiter: default_delimiter(),
            encoding: None,
            strict_header: false,
            filename_pattern: None,
            columns,
            unique: Vec::new(),
            date_order: Vec::new(),
        }
    }

    /// Built-in schema for `MED_DATA_YYYYMMDDHHMMSS.csv` reading files.
    pub fn default_med_data() -> Self {
        let mut columns = vec![
            ColumnSpec::new("batch_id", ColumnType::Integer)
                .required()
                .with_min(1.0),
            ColumnSpec::new("timestamp", ColumnType::Time).required(),
        ];
        for idx in 1..=10 {
            columns.push(
                ColumnSpec::new(format!("reading{idx}"), ColumnType::Float)
                    .required()
                    .with_max_exclusive(10.0),
            );
        }
        Self {
            name: "med_data".to_string(),
            delimiter: ',',
            encoding: None,
            strict_header: true,
            filename_pattern: Some(r"^MED_DATA_(\d{14})\.csv$".to_string()),
            columns,
            unique: vec!["batch_id".to_string()],
            date_order: Vec::new(),
        }
    }

    /// Parse and check a schema from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let schema: Schema = serde_json::from_str(text)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Load and check a schema from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    #[must_use]
    pub fn with_strict_header(mut self, strict: bool) -> Self {
        self.strict_header = strict;
        self
    }

    #[must_use]
    pub fn with_unique(mut self, column: impl Into<String>) -> Self {
        self.unique.push(column.into());
        self
    }

    #[must_use]
    pub fn with_date_order(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.date_order.push(DateOrderSpec::new(start, end));
        self
    }

    #[must_use]
    pub fn with_filename_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.filename_pattern = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = Some(label.into());
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    /// Delimiter as the byte the CSV reader expects.
    ///
    /// Only meaningful after [`Schema::validate`] has accepted the schema.
    pub fn delimiter_byte(&self) -> u8 {
        if self.delimiter.is_ascii() {
            self.delimiter as u8
        } else {
            b','
        }
    }

    /// Check internal consistency of the descriptor.
    pub fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() || self.delimiter == '"' || self.delimiter == '\n' {
            return Err(SchemaError::InvalidDelimiter {
                delimiter: self.delimiter,
            });
        }
        if self.columns.is_empty() {
            return Err(SchemaError::NoColumns);
        }

        let mut seen = BTreeSet::new();
        for (position, column) in self.columns.iter().enumerate() {
            if column.name.trim().is_empty() {
                return Err(SchemaError::EmptyColumnName { position });
            }
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::DuplicateColumn {
                    column: column.name.clone(),
                });
            }
            validate_column(column)?;
        }

        for name in &self.unique {
            if self.column(name).is_none() {
                return Err(SchemaError::UnknownColumn {
                    context: "unique constraint",
                    column: name.clone(),
                });
            }
        }

        for order in &self.date_order {
            for name in [&order.start, &order.end] {
                let Some(column) = self.column(name) else {
                    return Err(SchemaError::UnknownColumn {
                        context: "date order constraint",
                        column: name.clone(),
                    });
                };
                if !column.column_type.is_temporal() {
                    return Err(SchemaError::NotTemporal {
                        column: name.clone(),
                    });
                }
            }
        }

        if let Some(pattern) = &self.filename_pattern {
            compile_pattern(pattern)?;
        }
        Ok(())
    }
}

fn validate_column(column: &ColumnSpec) -> Result<()> {
    if column.has_bounds() && !column.column_type.is_numeric() {
        return Err(SchemaError::InvalidColumn {
            column: column.name.clone(),
            reason: format!("bounds require a numeric type, found {}", column.column_type),
        });
    }
    if column.format.is_some() && !column.column_type.is_temporal() {
        return Err(SchemaError::InvalidColumn {
            column: column.name.clone(),
            reason: format!("format requires a temporal type, found {}", column.column_type),
        });
    }
    if let (Some(min), Some(max)) = (column.min, column.max)
        && min > max
    {
        return Err(SchemaError::InvalidColumn {
            column: column.name.clone(),
            reason: format!("min {min} is greater than max {max}"),
        });
    }
    if let Some(pattern) = &column.pattern {
        compile_pattern(pattern)?;
    }
    Ok(())
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|error| SchemaError::InvalidPattern {
        pattern: pattern.to_string(),
        message: error.to_string(),
    })
}
