//! Command-line interface for Drive Fetcher

pub mod args;
pub mod commands;
pub mod progress;

pub use args::{Cli, Commands, ExportArgs, GlobalArgs, ScanArgs};
pub use commands::{handle_export, handle_scan};
pub use progress::ProgressReporter;
