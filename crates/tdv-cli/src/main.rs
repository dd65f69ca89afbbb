//! Trial Data Validator CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tdv_cli::config::ConfigError;
use tdv_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::error;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_gen_sample, run_process, run_schema};
use crate::summary::{print_summary, print_summary_json};

/// Exit status for configuration problems found before any file is touched.
const EXIT_CONFIG: i32 = 2;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match &cli.command {
        None => match run_process(&cli.batch) {
            Ok(summary) => {
                if cli.batch.json {
                    if let Err(error) = print_summary_json(&summary) {
                        eprintln!("error: {error}");
                    }
                } else {
                    print_summary(&summary);
                }
                if cli.batch.fail_on_rejected && summary.rejected > 0 {
                    1
                } else {
                    0
                }
            }
            Err(error) => {
                error!(error = %format!("{error:#}"), "batch aborted");
                eprintln!("error: {error:#}");
                if error.downcast_ref::<ConfigError>().is_some() {
                    EXIT_CONFIG
                } else {
                    1
                }
            }
        },
        Some(Command::GenSample(args)) => exit_code_for(run_gen_sample(args)),
        Some(Command::Schema) => exit_code_for(run_schema()),
    };
    std::process::exit(exit_code);
}

fn exit_code_for(result: anyhow::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
