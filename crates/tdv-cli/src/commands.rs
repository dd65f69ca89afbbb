use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use tdv_cli::batch::{CancelFlag, run_batch};
use tdv_cli::config::{BatchConfig, ConfigError};
use tdv_cli::sample::write_sample;
use tdv_cli::types::BatchSummary;
use tdv_model::Schema;

use crate::cli::{BatchArgs, GenSampleArgs};

pub fn run_process(args: &BatchArgs) -> Result<BatchSummary> {
    let schema = match &args.schema {
        Some(path) => Schema::load(path).map_err(ConfigError::from)?,
        None => Schema::default_med_data(),
    };
    let config = BatchConfig {
        incoming_dir: args.incoming_dir.clone(),
        archive_dir: args.archive_dir.clone(),
        rejected_dir: args.rejected_dir.clone(),
        log_dir: args.log_dir.clone(),
        workers: args.workers.get(),
        schema,
        dry_run: args.dry_run,
        dedupe: !args.no_dedupe,
        partition_by_date: args.partition_by_date,
    };
    run_batch(&config, &CancelFlag::new())
}

pub fn run_gen_sample(args: &GenSampleArgs) -> Result<()> {
    let path = write_sample(&args.output_dir, args.rows, Local::now().naive_local())?;
    info!(path = %path.display(), rows = args.rows, "sample written");
    println!("sample written to {}", path.display());
    Ok(())
}

pub fn run_schema() -> Result<()> {
    let json = serde_json::to_string_pretty(&Schema::default_med_data())
        .context("encode built-in schema")?;
    println!("{json}");
    Ok(())
}
