//! Command-line argument parsing for Drive Fetcher
//!
//! This module defines the CLI structure using clap derive macros: a `scan`
//! command that only builds and prints the task list, and an `export`
//! command that also drives the batch retrieval.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Drive Fetcher - batch download Google Drive files from tabular uploads
#[derive(Parser, Debug)]
#[command(
    name = "drive_fetcher",
    version,
    about = "Batch download Google Drive files referenced in CSV or Excel uploads",
    long_about = "Extracts Google Drive sharing links from a CSV or Excel file, names each file
from row metadata, and retrieves them one at a time with pacing between transfers."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract Drive references and download every file
    Export(ExportArgs),

    /// Extract Drive references and print the task list without downloading
    Scan(ScanArgs),
}

/// Arguments for the export command
#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Tabular input file (.csv, .xls or .xlsx)
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Directory renamed deliveries are written to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Pause between transfers in milliseconds
    #[arg(long, value_name = "MS")]
    pub pacing_ms: Option<u64>,

    /// Maximum number of tasks to attempt (for testing)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Show what would be downloaded without downloading
    #[arg(long)]
    pub dry_run: bool,
}

impl ExportArgs {
    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if let Some(0) = self.limit {
            return Err("--limit must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Arguments for the scan command
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Tabular input file (.csv, .xls or .xlsx)
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Emit the task list as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Log level implied by the verbosity flags; `None` defers to the
    /// configured default
    pub fn log_level(&self) -> Option<&'static str> {
        if self.global.quiet {
            Some("error")
        } else if self.global.very_verbose {
            Some("debug")
        } else if self.global.verbose {
            Some("info")
        } else {
            None
        }
    }
}
