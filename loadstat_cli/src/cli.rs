//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "loadstat", version, about = "Adaptive load sampling simulator")]
pub struct Cli {
    /// Path to config TOML; engine defaults are used when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit JSON lines instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging] level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drive a simulated queue through a live monitor and print every tick
    Run {
        /// Override sim.duration_ms
        #[arg(long, value_name = "MS")]
        duration_ms: Option<u64>,
        /// Override sim.arrival_per_sec
        #[arg(long, value_name = "N")]
        arrival_per_sec: Option<u32>,
        /// Override sim.service_ms
        #[arg(long, value_name = "MS")]
        service_ms: Option<u64>,
        /// Override sim.background
        #[arg(long, value_name = "N")]
        background: Option<u32>,
        /// Override sim.seed
        #[arg(long)]
        seed: Option<u64>,
        /// Write a control parameter before the run starts (repeatable)
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,
        /// Do not wait for the sampling loop to go idle after the workload ends
        #[arg(long, action = ArgAction::SetTrue)]
        no_drain: bool,
    },
    /// Print the control parameters, optionally after writing some
    Params {
        /// Write a control parameter (repeatable)
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,
    },
    /// Validate the configuration and exit
    Check,
}
