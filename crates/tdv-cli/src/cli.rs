//! CLI argument definitions for the trial data validator.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "tdv",
    version,
    about = "Trial Data Validator - check incoming CSV files and archive or reject them",
    long_about = "Validate delimited trial data files dropped into an incoming directory.\n\n\
                  Valid files are moved to the archive directory; files with any violation\n\
                  are moved to the rejected directory and described in a JSON-lines log.",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub batch: BatchArgs,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow row values in diagnostics (they may contain PHI).
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a valid sample file for the built-in schema.
    GenSample(GenSampleArgs),

    /// Print the built-in schema as JSON.
    Schema,
}

#[derive(Args)]
pub struct BatchArgs {
    /// Directory scanned for files to validate.
    #[arg(long = "incoming-dir", value_name = "DIR", default_value = "data/incoming")]
    pub incoming_dir: PathBuf,

    /// Destination for valid files.
    #[arg(long = "archive-dir", value_name = "DIR", default_value = "data/archive")]
    pub archive_dir: PathBuf,

    /// Destination for files with violations.
    #[arg(long = "rejected-dir", value_name = "DIR", default_value = "data/rejected")]
    pub rejected_dir: PathBuf,

    /// Directory holding errors.jsonl and seen_files.jsonl.
    #[arg(long = "log-dir", value_name = "DIR", default_value = "logs")]
    pub log_dir: PathBuf,

    /// Number of files processed in parallel.
    #[arg(long = "workers", value_name = "N", default_value = "1")]
    pub workers: NonZeroUsize,

    /// JSON schema descriptor (default: built-in MED_DATA schema).
    #[arg(long = "schema", value_name = "PATH")]
    pub schema: Option<PathBuf>,

    /// Validate and report without moving or logging anything.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Do not reject files whose content was already archived.
    #[arg(long = "no-dedupe")]
    pub no_dedupe: bool,

    /// Place files under YYYY/MM/DD subdirectories.
    #[arg(long = "partition-by-date")]
    pub partition_by_date: bool,

    /// Exit with status 1 when any file was rejected.
    #[arg(long = "fail-on-rejected")]
    pub fail_on_rejected: bool,

    /// Print the batch summary as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct GenSampleArgs {
    /// Directory the sample is written to.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "data/incoming")]
    pub output_dir: PathBuf,

    /// Number of data rows.
    #[arg(long = "rows", value_name = "N", default_value = "5")]
    pub rows: usize,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
