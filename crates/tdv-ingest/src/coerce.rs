//! Raw field to typed [`Cell`] coercion.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use tdv_model::{Cell, ColumnSpec, ColumnType, Value};

/// Coerce a raw field into the column's declared type.
///
/// Never fails: values that do not parse become [`Cell::Invalid`] and are
/// reported by the rule engine.
pub fn coerce(raw: &str, column: &ColumnSpec) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Cell::Missing;
    }
    let parsed = match column.column_type {
        ColumnType::Text => Some(Value::Text(trimmed.to_string())),
        ColumnType::Integer => trimmed.parse::<i64>().ok().map(Value::Integer),
        ColumnType::Float => trimmed
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(Value::Float),
        ColumnType::Date => column
            .temporal_format()
            .and_then(|format| NaiveDate::parse_from_str(trimmed, format).ok())
            .map(Value::Date),
        ColumnType::Time => column
            .temporal_format()
            .and_then(|format| NaiveTime::parse_from_str(trimmed, format).ok())
            .map(Value::Time),
        ColumnType::DateTime => column
            .temporal_format()
            .and_then(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
            .map(Value::DateTime),
    };
    match parsed {
        Some(value) => Cell::Valid(value),
        None => Cell::Invalid {
            raw: trimmed.to_string(),
            expected: column.column_type,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_is_missing() {
        let column = ColumnSpec::new("id", ColumnType::Integer);
        assert_eq!(coerce("   ", &column), Cell::Missing);
    }

    #[test]
    fn integer_parses_after_trim() {
        let column = ColumnSpec::new("id", ColumnType::Integer);
        assert_eq!(coerce(" 42 ", &column), Cell::Valid(Value::Integer(42)));
        assert!(matches!(coerce("4.2", &column), Cell::Invalid { .. }));
    }

    #[test]
    fn float_rejects_non_finite() {
        let column = ColumnSpec::new("reading1", ColumnType::Float);
        assert_eq!(coerce("0.5", &column), Cell::Valid(Value::Float(0.5)));
        assert!(matches!(coerce("NaN", &column), Cell::Invalid { .. }));
        assert!(matches!(coerce("inf", &column), Cell::Invalid { .. }));
    }

    #[test]
    fn date_uses_column_format() {
        let iso = ColumnSpec::new("start", ColumnType::Date);
        assert_eq!(
            coerce("2024-05-01", &iso),
            Cell::Valid(Value::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()))
        );
        let us = ColumnSpec::new("start", ColumnType::Date).with_format("%m/%d/%Y");
        assert_eq!(
            coerce("05/01/2024", &us),
            Cell::Valid(Value::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()))
        );
        assert!(matches!(coerce("2024-13-01", &iso), Cell::Invalid { .. }));
    }

    #[test]
    fn time_requires_full_clock() {
        let column = ColumnSpec::new("timestamp", ColumnType::Time);
        assert_eq!(
            coerce("12:00:00", &column),
            Cell::Valid(Value::Time(NaiveTime::from_hms_opt(12, 0, 0).unwrap()))
        );
        assert!(matches!(coerce("noon", &column), Cell::Invalid { .. }));
    }
}
