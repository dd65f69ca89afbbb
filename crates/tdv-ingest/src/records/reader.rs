//! Lazy CSV record reading against a declared schema.

use std::io::Cursor;

use csv::{ReaderBuilder, StringRecord, Trim};

use tdv_model::{Record, Schema};

use crate::coerce::coerce;
use crate::decode::decode_bytes;
use crate::error::ParseError;

use super::header::{BoundColumn, CsvHeaders};

/// Streams [`Record`]s out of decoded file text.
///
/// The header is read and bound to the schema on construction. Data rows are
/// parsed one at a time; after the first error the reader yields nothing more.
/// Restarting means building a new reader from the source.
pub struct RecordReader {
    reader: csv::Reader<Cursor<Vec<u8>>>,
    headers: CsvHeaders,
    columns: Vec<BoundColumn>,
    row: StringRecord,
    next_index: usize,
    finished: bool,
}

impl RecordReader {
    /// Build a reader over already-decoded text.
    pub fn new(text: String, schema: &Schema) -> Result<Self, ParseError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(Trim::All)
            .delimiter(schema.delimiter_byte())
            .from_reader(Cursor::new(text.into_bytes()));

        let headers = CsvHeaders::new(reader.headers().map_err(ParseError::from)?.iter());
        let columns = headers.bind(schema)?;
        let ignored = headers.columns.len().saturating_sub(columns.len());
        if ignored > 0 {
            tracing::debug!(
                schema = %schema.name,
                ignored,
                "extra columns not declared in the schema are ignored"
            );
        }

        Ok(Self {
            reader,
            headers,
            columns,
            row: StringRecord::new(),
            next_index: 0,
            finished: false,
        })
    }

    /// Decode raw bytes using the schema's encoding, then build a reader.
    pub fn from_bytes(bytes: &[u8], schema: &Schema) -> Result<Self, ParseError> {
        let text = decode_bytes(bytes, schema.encoding.as_deref())?;
        Self::new(text, schema)
    }

    pub fn headers(&self) -> &CsvHeaders {
        &self.headers
    }

    fn build_record(&self) -> Record {
        let line = self
            .row
            .position()
            .map(csv::Position::line)
            .unwrap_or_default();
        let mut record = Record::new(self.next_index, line);
        for column in &self.columns {
            let raw = self.row.get(column.position).unwrap_or("");
            record
                .cells
                .insert(column.spec.name.clone(), coerce(raw, &column.spec));
        }
        record
    }
}

impl Iterator for RecordReader {
    type Item = Result<Record, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.reader.read_record(&mut self.row) {
            Ok(true) => {
                let record = self.build_record();
                self.next_index += 1;
                Some(Ok(record))
            }
            Ok(false) => {
                self.finished = true;
                None
            }
            Err(error) => {
                self.finished = true;
                tracing::debug!(
                    records_read = self.next_index,
                    line = error.position().map(csv::Position::line),
                    "stopped reading at malformed row"
                );
                Some(Err(ParseError::from(error)))
            }
        }
    }
}

/// Parse a whole file eagerly. Returns the first parse error, if any.
pub fn read_records(bytes: &[u8], schema: &Schema) -> Result<Vec<Record>, ParseError> {
    RecordReader::from_bytes(bytes, schema)?.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdv_model::{Cell, ColumnSpec, ColumnType, Value};

    fn schema() -> Schema {
        Schema::new(
            "visits",
            vec![
                ColumnSpec::new("id", ColumnType::Integer).required(),
                ColumnSpec::new("start_date", ColumnType::Date),
            ],
        )
    }

    #[test]
    fn test_reads_records_in_row_order() {
        let records = read_records(b"id,start_date\n1,2024-01-01\n2,\n", &schema()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].index, 0);
        assert_eq!(records[0].line, 2);
        assert_eq!(records[0].value("id"), Some(&Value::Integer(1)));
        assert_eq!(records[1].index, 1);
        assert_eq!(records[1].cell("start_date"), &Cell::Missing);
    }

    #[test]
    fn test_column_count_mismatch_is_parse_error() {
        let err = read_records(b"id,start_date\n1,2024-01-01\n2\n", &schema()).unwrap_err();
        assert_eq!(
            err,
            ParseError::ColumnCount {
                line: 3,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_empty_text_has_no_header() {
        let err = read_records(b"", &schema()).unwrap_err();
        assert_eq!(err, ParseError::Empty);
    }

    #[test]
    fn test_custom_delimiter() {
        let schema = schema().with_delimiter(';');
        let records = read_records(b"id;start_date\n7;2024-02-03\n", &schema).unwrap();
        assert_eq!(records[0].value("id"), Some(&Value::Integer(7)));
    }

    #[test]
    fn test_reader_stops_after_error() {
        let mut reader =
            RecordReader::from_bytes(b"id,start_date\n1,x,extra\n2,2024-01-01\n", &schema())
                .unwrap();
        assert!(matches!(reader.next(), Some(Err(ParseError::ColumnCount { .. }))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let records =
            read_records(b"site,id,start_date
ABC,1,2024-01-01
", &schema()).unwrap();
        assert_eq!(records[0].value("id"), Some(&Value::Integer(1)));
        assert!(records[0].cells.get("site").is_none());
    }
}
