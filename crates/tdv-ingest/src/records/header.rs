//! CSV header normalization and schema binding.

use std::collections::BTreeSet;

use tdv_model::{ColumnSpec, Schema};

use crate::error::ParseError;

/// Header row of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvHeaders {
    /// Normalized column names in file order.
    pub columns: Vec<String>,
}

/// A declared column and its position in the file.
#[derive(Debug, Clone)]
pub struct BoundColumn {
    pub spec: ColumnSpec,
    pub position: usize,
}

impl CsvHeaders {
    pub fn new<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            columns: raw
                .into_iter()
                .map(|value| normalize_header(value.as_ref()))
                .collect(),
        }
    }

    /// Returns true if there are no non-blank column names.
    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(String::is_empty)
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }

    /// Match the header against the schema.
    ///
    /// Strict schemas need the exact declared column list in order. Otherwise
    /// every declared column must be present and extra columns are ignored.
    pub fn bind(&self, schema: &Schema) -> Result<Vec<BoundColumn>, ParseError> {
        if self.is_empty() {
            return Err(ParseError::Empty);
        }

        let mut seen = BTreeSet::new();
        for name in &self.columns {
            if !name.is_empty() && !seen.insert(name.as_str()) {
                return Err(ParseError::DuplicateHeader {
                    column: name.clone(),
                });
            }
        }

        if schema.strict_header
            && !schema
                .column_names()
                .eq(self.columns.iter().map(String::as_str))
        {
            return Err(ParseError::HeaderMismatch {
                expected: schema.column_names().map(str::to_string).collect(),
                found: self.columns.clone(),
            });
        }

        let missing: Vec<String> = schema
            .column_names()
            .filter(|name| self.position(name).is_none())
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(ParseError::MissingColumns { columns: missing });
        }

        Ok(schema
            .columns
            .iter()
            .filter_map(|spec| {
                self.position(&spec.name).map(|position| BoundColumn {
                    spec: spec.clone(),
                    position,
                })
            })
            .collect())
    }
}

/// Normalizes a header value: trims whitespace and a stray BOM.
pub fn normalize_header(value: &str) -> String {
    value.trim().trim_matches('\u{feff}').trim().to_string()
}
