//! Sample file generator for the built-in schema.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

use tdv_model::Schema;

/// Write a valid `MED_DATA_<stamp>.csv` with `rows` data rows into `dir`.
///
/// Fails rather than overwrite an existing file.
pub fn write_sample(dir: &Path, rows: usize, stamp: NaiveDateTime) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(format!("MED_DATA_{}.csv", stamp.format("%Y%m%d%H%M%S")));
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .with_context(|| format!("create {}", path.display()))?;

    let schema = Schema::default_med_data();
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(schema.column_names())?;

    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();
    for idx in 1..=rows {
        let time = noon + TimeDelta::seconds((idx % 86_400) as i64);
        let reading = format!("{:.3}", (idx % 90) as f64 * 0.1 + 0.1);
        let mut record = vec![idx.to_string(), time.format("%H:%M:%S").to_string()];
        record.extend(std::iter::repeat_n(reading, 10));
        writer.write_record(&record)?;
    }
    writer
        .flush()
        .with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}
