//! Batch driver and CLI support for the trial data validator.

pub mod batch;
pub mod config;
pub mod logging;
pub mod sample;
pub mod types;
