//! Integration tests for record parsing from files on disk.

use std::fs;

use tdv_ingest::{ParseError, RecordReader, list_incoming_files, read_records, read_source_bytes};
use tdv_model::{Cell, ColumnSpec, ColumnType, Schema, Value};

fn visits_schema() -> Schema {
    Schema::new(
        "visits",
        vec![
            ColumnSpec::new("id", ColumnType::Integer).required(),
            ColumnSpec::new("start_date", ColumnType::Date).required(),
            ColumnSpec::new("end_date", ColumnType::Date),
        ],
    )
    .with_date_order("start_date", "end_date")
}

#[test]
fn reads_incoming_file_into_typed_records() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(
        dir.path().join("visits.csv"),
        "id,start_date,end_date,comment\n1,2024-05-01,2024-05-03,first\n2,2024-06-01,,\n",
    )
    .expect("write csv");

    let files = list_incoming_files(dir.path()).expect("list files");
    assert_eq!(files.len(), 1);
    let bytes = read_source_bytes(&files[0]).expect("read bytes");
    let records = read_records(&bytes, &visits_schema()).expect("parse");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].value("id"), Some(&Value::Integer(1)));
    assert!(records[0].cells.get("comment").is_none());
    assert_eq!(records[1].cell("end_date"), &Cell::Missing);
}

#[test]
fn strict_default_schema_rejects_reordered_header() {
    let schema = Schema::default_med_data();
    let mut header: Vec<String> = schema.column_names().map(str::to_string).collect();
    header.swap(0, 1);
    let text = format!("{}\n", header.join(","));

    let err = read_records(text.as_bytes(), &schema).expect_err("header mismatch");
    assert!(matches!(err, ParseError::HeaderMismatch { .. }));
}

#[test]
fn default_schema_accepts_generated_style_sample() {
    let schema = Schema::default_med_data();
    let mut text = schema.column_names().collect::<Vec<_>>().join(",");
    text.push('\n');
    for idx in 1..=5 {
        let readings = vec![format!("{:.3}", f64::from(idx) * 0.1); 10].join(",");
        text.push_str(&format!("{idx},12:00:00,{readings}\n"));
    }

    let records = read_records(text.as_bytes(), &schema).expect("parse sample");
    assert_eq!(records.len(), 5);
    assert_eq!(records[4].value("batch_id"), Some(&Value::Integer(5)));
    assert_eq!(records[4].value("reading10"), Some(&Value::Float(0.5)));
}

#[test]
fn utf16_file_with_bom_is_decoded() {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "id,start_date,end_date\n3,2024-01-01,2024-01-02\n".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let records: Vec<_> = RecordReader::from_bytes(&bytes, &visits_schema())
        .expect("reader")
        .collect::<Result<_, _>>()
        .expect("records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].value("id"), Some(&Value::Integer(3)));
}

#[test]
fn invalid_values_are_kept_for_the_rule_engine() {
    let records = read_records(
        b"id,start_date,end_date\nabc,2024-02-30,\n",
        &visits_schema(),
    )
    .expect("parse");
    assert!(matches!(records[0].cell("id"), Cell::Invalid { .. }));
    assert!(matches!(
        records[0].cell("start_date"),
        Cell::Invalid {
            expected: ColumnType::Date,
            ..
        }
    ));
}
