//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(
    name = "flowmeter",
    version,
    about = "Water-meter pulse captures to flow rate and running total"
)]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/flowmeter.toml")]
    pub config: PathBuf,

    /// Log and print results as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); defaults to logging.level, then info
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Locate rising edges in a raw logic-analyzer export
    Edges {
        /// Raw export CSV (timestamp, digital, ...)
        #[arg(long, value_name = "RAW")]
        input: PathBuf,
        /// Pulses CSV to write
        #[arg(long, value_name = "PULSES")]
        output: PathBuf,
        /// Keep every row, flag zeroed except at rising edges
        #[arg(long, action = ArgAction::SetTrue)]
        keep_all_rows: bool,
    },
    /// Reduce a pulses file to rate/total points
    Reduce {
        /// Pulses CSV (timestamp, flag)
        #[arg(long, value_name = "PULSES")]
        input: PathBuf,
        /// Reduced CSV to write (Time mS, Rate, Total)
        #[arg(long, value_name = "RATES")]
        output: PathBuf,
        /// Override reduce.cal_factor (volume per pulse)
        #[arg(long, value_name = "F")]
        cal_factor: Option<f64>,
        /// Override reduce.zero_threshold_ms
        #[arg(long, value_name = "MS")]
        zero_threshold_ms: Option<f64>,
    },
    /// Edges then reduce, raw export straight to the reduced file
    Process {
        #[arg(long, value_name = "RAW")]
        input: PathBuf,
        #[arg(long, value_name = "RATES")]
        output: PathBuf,
        /// Also write the intermediate pulses file
        #[arg(long, value_name = "PULSES")]
        pulses: Option<PathBuf>,
        #[arg(long, action = ArgAction::SetTrue)]
        keep_all_rows: bool,
        #[arg(long, value_name = "F")]
        cal_factor: Option<f64>,
    },
    /// Decimate a reduced file and send it to the recording tool as commands
    Upload {
        /// Reduced CSV (Time mS, Rate, Total)
        #[arg(long, value_name = "RATES")]
        input: PathBuf,
        /// Command script to write (stdout when absent)
        #[arg(long, value_name = "FILE")]
        script: Option<PathBuf>,
        /// Write a bulk-import CSV here and issue one import instead of per-sample appends
        #[arg(long, value_name = "CSV")]
        bulk: Option<PathBuf>,
        /// Override decimate.keep_every_nth
        #[arg(long, value_name = "N")]
        keep_every_nth: Option<u32>,
    },
    /// Validate the config file and print the effective settings
    CheckConfig,
}
