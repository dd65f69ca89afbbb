//! End-to-end batch runs over temporary directory trees.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use tdv_cli::batch::{CancelFlag, run_batch};
use tdv_cli::config::{BatchConfig, ConfigError};
use tdv_cli::types::FileStatus;
use tdv_model::{ColumnSpec, ColumnType, RuleCode, Schema};
use tdv_output::read_log;

const HEADER: &str = "batch_id,timestamp,reading1,reading2,reading3,reading4,reading5,\
                      reading6,reading7,reading8,reading9,reading10";

fn med_data(rows: &[&str]) -> String {
    let mut text = format!("{HEADER}\n");
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}

fn valid_rows(first_id: usize) -> String {
    let rows: Vec<String> = (first_id..first_id + 3)
        .map(|id| format!("{id},12:00:00,0.1,0.2,0.3,0.4,0.5,0.6,0.7,0.8,0.9,1.0"))
        .collect();
    med_data(&rows.iter().map(String::as_str).collect::<Vec<_>>())
}

fn setup() -> (TempDir, BatchConfig) {
    let root = TempDir::new().unwrap();
    let config = BatchConfig::rooted_at(root.path());
    fs::create_dir_all(&config.incoming_dir).unwrap();
    (root, config)
}

fn drop_file(config: &BatchConfig, name: &str, content: &str) -> PathBuf {
    let path = config.incoming_dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn entries(dir: &Path) -> Vec<String> {
    let Ok(read) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = read
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn valid_file_is_archived_unchanged() {
    let (_root, config) = setup();
    let content = valid_rows(1);
    drop_file(&config, "MED_DATA_20240101120000.csv", &content);

    let summary = run_batch(&config, &CancelFlag::new()).unwrap();

    assert_eq!((summary.validated, summary.rejected, summary.errored), (1, 0, 0));
    let archived = config.archive_dir.join("MED_DATA_20240101120000.csv");
    assert_eq!(fs::read_to_string(archived).unwrap(), content);
    assert!(entries(&config.incoming_dir).is_empty());
    assert!(read_log(&config.violation_log_path()).unwrap().is_empty());
}

#[test]
fn rejected_file_gets_exactly_one_log_entry() {
    let (_root, config) = setup();
    drop_file(
        &config,
        "MED_DATA_20240101120000.csv",
        &med_data(&[
            ",12:00:00,0.1,0.2,0.3,0.4,0.5,0.6,0.7,0.8,0.9,1.0",
            "2,12:00:00,0.1,0.2,0.3,0.4,0.5,0.6,0.7,0.8,0.9,12.5",
        ]),
    );

    let summary = run_batch(&config, &CancelFlag::new()).unwrap();

    assert_eq!((summary.validated, summary.rejected, summary.errored), (0, 1, 0));
    assert!(config.rejected_dir.join("MED_DATA_20240101120000.csv").exists());

    let log = read_log(&config.violation_log_path()).unwrap();
    assert_eq!(log.len(), 1);
    let codes: Vec<(RuleCode, Option<usize>)> = log[0]
        .violations
        .iter()
        .map(|v| (v.rule_code, v.record_index))
        .collect();
    assert_eq!(
        codes,
        vec![(RuleCode::RequiredField, Some(0)), (RuleCode::OutOfRange, Some(1))]
    );
    assert_eq!(log[0].violations[0].field_name.as_deref(), Some("batch_id"));
    assert_eq!(log[0].total_records, 2);
}

#[test]
fn empty_incoming_is_a_no_op() {
    let (_root, config) = setup();

    let first = run_batch(&config, &CancelFlag::new()).unwrap();
    let second = run_batch(&config, &CancelFlag::new()).unwrap();

    for summary in [first, second] {
        assert_eq!((summary.validated, summary.rejected, summary.errored), (0, 0, 0));
    }
    assert!(entries(&config.archive_dir).is_empty());
    assert!(entries(&config.rejected_dir).is_empty());
}

#[test]
fn missing_incoming_is_a_config_error() {
    let root = TempDir::new().unwrap();
    let config = BatchConfig::rooted_at(root.path());

    let error = run_batch(&config, &CancelFlag::new()).unwrap_err();
    assert!(matches!(
        error.downcast_ref::<ConfigError>(),
        Some(ConfigError::IncomingMissing { .. })
    ));
}

#[test]
fn same_name_in_later_batch_is_disambiguated() {
    let (_root, config) = setup();
    let name = "MED_DATA_20240101120000.csv";

    drop_file(&config, name, &valid_rows(1));
    run_batch(&config, &CancelFlag::new()).unwrap();
    drop_file(&config, name, &valid_rows(10));
    run_batch(&config, &CancelFlag::new()).unwrap();

    assert_eq!(
        entries(&config.archive_dir),
        vec![
            "MED_DATA_20240101120000.csv".to_string(),
            "MED_DATA_20240101120000_1.csv".to_string()
        ]
    );
    assert_eq!(
        fs::read_to_string(config.archive_dir.join(name)).unwrap(),
        valid_rows(1)
    );
}

#[test]
fn identical_content_is_rejected_as_duplicate() {
    let (_root, config) = setup();
    let content = valid_rows(1);
    drop_file(&config, "MED_DATA_20240101120000.csv", &content);
    drop_file(&config, "MED_DATA_20240101130000.csv", &content);

    let summary = run_batch(&config, &CancelFlag::new()).unwrap();

    assert_eq!((summary.validated, summary.rejected), (1, 1));
    assert_eq!(summary.files[1].status, FileStatus::Rejected);
    assert_eq!(summary.files[1].violations[0].rule_code, RuleCode::DuplicateFile);
}

#[test]
fn no_dedupe_archives_identical_content() {
    let (_root, mut config) = setup();
    config.dedupe = false;
    let content = valid_rows(1);
    drop_file(&config, "MED_DATA_20240101120000.csv", &content);
    drop_file(&config, "MED_DATA_20240101130000.csv", &content);

    let summary = run_batch(&config, &CancelFlag::new()).unwrap();

    assert_eq!(summary.validated, 2);
    assert!(!config.seen_ledger_path().exists());
}

#[test]
fn parallel_workers_match_sequential_outcomes() {
    let (_root, mut config) = setup();
    config.workers = 4;
    for idx in 0..12 {
        let name = format!("MED_DATA_202401011200{idx:02}.csv");
        let content = if idx % 3 == 0 {
            med_data(&["0,12:00:00,0.1,0.2,0.3,0.4,0.5,0.6,0.7,0.8,0.9,1.0"])
        } else {
            valid_rows(idx * 10)
        };
        drop_file(&config, &name, &content);
    }

    let summary = run_batch(&config, &CancelFlag::new()).unwrap();

    assert_eq!((summary.validated, summary.rejected, summary.errored), (8, 4, 0));
    let names: Vec<&str> = summary.files.iter().map(|f| f.file_name.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
    assert_eq!(read_log(&config.violation_log_path()).unwrap().len(), 4);
    assert_eq!(entries(&config.archive_dir).len(), 8);
    assert_eq!(entries(&config.rejected_dir).len(), 4);
}

fn logged_codes(config: &BatchConfig) -> Vec<(String, Vec<RuleCode>)> {
    let mut codes: Vec<(String, Vec<RuleCode>)> = read_log(&config.violation_log_path())
        .unwrap()
        .into_iter()
        .map(|entry| {
            let codes = entry.violations.iter().map(|v| v.rule_code).collect();
            (entry.file_name, codes)
        })
        .collect();
    codes.sort();
    codes
}

#[test]
fn identical_invalid_files_log_the_same_violations_for_any_worker_count() {
    let content = med_data(&["1,12:00:00,0.1,0.2,0.3,0.4,0.5,0.6,0.7,0.8,0.9,12.5"]);
    let mut runs = Vec::new();
    for workers in [1, 4] {
        let (_root, mut config) = setup();
        config.workers = workers;
        for idx in 0..8 {
            drop_file(&config, &format!("MED_DATA_202401011200{idx:02}.csv"), &content);
        }

        let summary = run_batch(&config, &CancelFlag::new()).unwrap();

        assert_eq!((summary.validated, summary.rejected), (0, 8));
        runs.push(logged_codes(&config));
    }

    assert_eq!(runs[0], runs[1]);
    assert!(
        runs[1]
            .iter()
            .all(|(_, codes)| codes == &vec![RuleCode::OutOfRange])
    );
}

#[test]
fn identical_valid_files_in_parallel_archive_once() {
    let (_root, mut config) = setup();
    config.workers = 4;
    let content = valid_rows(1);
    for idx in 0..6 {
        drop_file(&config, &format!("MED_DATA_202401011200{idx:02}.csv"), &content);
    }

    let summary = run_batch(&config, &CancelFlag::new()).unwrap();

    assert_eq!((summary.validated, summary.rejected), (1, 5));
    for (_, codes) in logged_codes(&config) {
        assert_eq!(codes, vec![RuleCode::DuplicateFile]);
    }
}

#[test]
fn failed_disposition_is_errored_and_batch_continues() {
    let (_root, mut config) = setup();
    config.partition_by_date = true;
    fs::create_dir_all(&config.archive_dir).unwrap();
    // A plain file where the 2023 partition directory would go.
    fs::write(config.archive_dir.join("2023"), "").unwrap();
    drop_file(&config, "MED_DATA_20230615080000.csv", &valid_rows(1));
    drop_file(&config, "MED_DATA_20240615080000.csv", &valid_rows(10));
    drop_file(
        &config,
        "MED_DATA_20240615090000.csv",
        &med_data(&["1,12:00:00,0.1,0.2,0.3,0.4,0.5,0.6,0.7,0.8,0.9,12.5"]),
    );

    let summary = run_batch(&config, &CancelFlag::new()).unwrap();

    assert_eq!((summary.validated, summary.rejected, summary.errored), (1, 1, 1));
    assert_eq!(summary.files[0].status, FileStatus::Errored);
    assert!(summary.files[0].error.is_some());
    assert_eq!(
        entries(&config.incoming_dir),
        vec!["MED_DATA_20230615080000.csv".to_string()]
    );
    assert!(
        config
            .archive_dir
            .join("2024/06/15/MED_DATA_20240615080000.csv")
            .exists()
    );
    assert_eq!(read_log(&config.violation_log_path()).unwrap().len(), 1);
}

#[test]
fn cancelled_batch_leaves_files_in_place() {
    let (_root, config) = setup();
    drop_file(&config, "MED_DATA_20240101120000.csv", &valid_rows(1));
    let cancel = CancelFlag::new();
    cancel.cancel();

    let summary = run_batch(&config, &cancel).unwrap();

    assert_eq!(summary.total(), 0);
    assert_eq!(summary.skipped, 1);
    assert_eq!(entries(&config.incoming_dir).len(), 1);
}

#[test]
fn dry_run_moves_nothing() {
    let (_root, mut config) = setup();
    config.dry_run = true;
    drop_file(&config, "bad_name.csv", &valid_rows(1));

    let summary = run_batch(&config, &CancelFlag::new()).unwrap();

    assert_eq!(summary.rejected, 1);
    assert!(summary.files[0].destination.is_none());
    assert_eq!(entries(&config.incoming_dir), vec!["bad_name.csv".to_string()]);
    assert!(!config.log_dir.exists());
}

#[test]
fn custom_schema_date_order() {
    let (_root, mut config) = setup();
    config.schema = Schema::new(
        "visits",
        vec![
            ColumnSpec::new("id", ColumnType::Integer).required(),
            ColumnSpec::new("start_date", ColumnType::Date),
            ColumnSpec::new("end_date", ColumnType::Date),
        ],
    )
    .with_date_order("start_date", "end_date");
    drop_file(&config, "visits.csv", "id,start_date,end_date\n1,2024-05-01,2024-04-01\n");

    let summary = run_batch(&config, &CancelFlag::new()).unwrap();

    assert_eq!(summary.rejected, 1);
    let violations = &summary.files[0].violations;
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].rule_code, RuleCode::DateOrder);
    assert_eq!(violations[0].record_index, Some(0));
}

#[test]
fn partitioned_archive_uses_filename_date() {
    let (_root, mut config) = setup();
    config.partition_by_date = true;
    drop_file(&config, "MED_DATA_20230615080000.csv", &valid_rows(1));

    run_batch(&config, &CancelFlag::new()).unwrap();

    assert!(
        config
            .archive_dir
            .join("2023/06/15/MED_DATA_20230615080000.csv")
            .exists()
    );
}

#[test]
fn generated_sample_passes_validation() {
    let (_root, config) = setup();
    let stamp = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(3, 4, 5)
        .unwrap();
    tdv_cli::sample::write_sample(&config.incoming_dir, 200, stamp).unwrap();

    let summary = run_batch(&config, &CancelFlag::new()).unwrap();

    assert_eq!(summary.validated, 1, "{:?}", summary.files[0].violations);
    assert_eq!(summary.files[0].total_records, 200);
}
