//! Command handlers for Drive Fetcher CLI
//!
//! This module implements the handlers that coordinate between CLI
//! arguments, configuration and the core pipeline: decode the upload, build
//! the task list, and (for `export`) drive the batch retrieval.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;

use crate::app::{
    build_tasks, parse_bytes, BrowserOpener, Coordinator, DirectorySink, DriveClient,
    DriveStrategy, TaskList, TaskStatus,
};
use crate::cli::args::{ExportArgs, ScanArgs};
use crate::cli::progress::ProgressReporter;
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Build the task list from an input file.
///
/// Input-shape problems abort here, before any task list exists; an input
/// with no references yields an empty list for the caller to surface as an
/// advisory.
async fn build_from_file(input: &Path) -> Result<TaskList> {
    let source_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    let bytes = tokio::fs::read(input).await?;
    let rows = parse_bytes(&source_name, &bytes)?;
    let list = build_tasks(&rows);

    info!(
        "Built {} tasks from {} rows in {}",
        list.len(),
        rows.len(),
        source_name
    );
    Ok(list)
}

fn print_task_table(list: &TaskList) {
    println!("{:<6} {:<40} {}", "Row", "Target name", "Original link");
    for task in list.tasks() {
        println!(
            "{:<6} {:<40} {}",
            format!("#{}", task.source_row),
            task.target_name,
            task.original_reference
        );
    }
}

/// Handle the scan command
pub async fn handle_scan(args: ScanArgs, _config: &AppConfig) -> Result<()> {
    let list = build_from_file(&args.input).await?;

    if list.is_empty() {
        println!("No Google Drive links found in the uploaded file.");
        return Ok(());
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(list.tasks()).map_err(|e| AppError::generic(format!(
                "could not render task list: {}",
                e
            )))?
        );
    } else {
        println!("Found {} Google Drive link(s)\n", list.len());
        print_task_table(&list);
    }
    Ok(())
}

/// Handle the export command
pub async fn handle_export(args: ExportArgs, config: &AppConfig) -> Result<()> {
    args.validate().map_err(AppError::generic)?;

    let mut list = build_from_file(&args.input).await?;

    if list.is_empty() {
        println!("No Google Drive links found in the uploaded file.");
        return Ok(());
    }

    if let Some(limit) = args.limit {
        if list.len() > limit {
            info!("Limiting run to {} tasks (from {} total)", limit, list.len());
            list.truncate(limit);
        }
    }

    if args.dry_run {
        println!("Dry run - would download {} file(s)\n", list.len());
        print_task_table(&list);
        return Ok(());
    }

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output_directory());

    let mut coordinator_config = config.coordinator_config();
    if let Some(pacing_ms) = args.pacing_ms {
        coordinator_config.pacing = Duration::from_millis(pacing_ms);
    }

    let client = DriveClient::with_config(&config.client_config())?;
    let strategy = DriveStrategy::new(
        Arc::new(client),
        Arc::new(DirectorySink::new(&output_dir)),
        Arc::new(BrowserOpener),
    );

    let (progress_tx, progress_rx) = mpsc::channel(32);
    let reporter = ProgressReporter::spawn(list.len(), progress_rx);
    let coordinator = Coordinator::with_config(Arc::new(strategy), coordinator_config)
        .with_progress(progress_tx);

    let summary = coordinator.run(&mut list).await?;
    reporter.finish().await;

    println!(
        "\nDone: {} saved, {} opened in browser, {} failed, {} skipped",
        summary.delivered_renamed,
        summary.delivered_fallback,
        summary.failed,
        summary.skipped
    );
    if summary.delivered_fallback > 0 {
        println!(
            "Files opened in the browser keep their Drive-assigned names; \
             delivery there cannot be confirmed from here."
        );
    }

    for task in list
        .tasks()
        .iter()
        .filter(|task| task.status == TaskStatus::Error)
    {
        println!(
            "  failed row #{}: {} ({})",
            task.source_row, task.target_name, task.original_reference
        );
    }

    println!("Renamed files were saved to {}", output_dir.display());
    Ok(())
}
