//! Drive Fetcher CLI application
//!
//! Command-line interface for batch downloading Google Drive files
//! referenced in CSV or Excel uploads.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use drive_fetcher::cli::{handle_export, handle_scan, Cli, Commands};
use drive_fetcher::config::AppConfig;
use drive_fetcher::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration (defaults when no file exists)
    let config = AppConfig::load(cli.global.config.as_deref())?;

    // Initialize logging; verbosity flags override the configured default
    init_logging(&cli, &config);

    info!("Drive Fetcher v{} starting", env!("CARGO_PKG_VERSION"));

    // Execute the appropriate command
    match cli.command {
        Commands::Export(args) => {
            info!("Executing export command");
            handle_export(args, &config).await
        }
        Commands::Scan(args) => {
            info!("Executing scan command");
            handle_scan(args, &config).await
        }
    }
}

/// Initialize logging from CLI verbosity and the configured default level
fn init_logging(cli: &Cli, config: &AppConfig) {
    let log_level = cli
        .log_level()
        .unwrap_or(config.logging.level.as_str());

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("drive_fetcher={}", log_level).parse().unwrap());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .init();
}
