//! Core application logic for Drive Fetcher
//!
//! This module contains the extraction-and-naming pipeline (tabular adapter,
//! reference extractor, task builder) and the batch retrieval machinery
//! (task list, orchestrator, strategy, Drive client).
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use drive_fetcher::app::{
//!     build_tasks, parse_bytes, BrowserOpener, Coordinator, DirectorySink, DriveClient,
//!     DriveStrategy,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = tokio::fs::read("upload.csv").await?;
//! let rows = parse_bytes("upload.csv", &bytes)?;
//! let mut tasks = build_tasks(&rows);
//!
//! let strategy = DriveStrategy::new(
//!     Arc::new(DriveClient::new()?),
//!     Arc::new(DirectorySink::new("downloads")),
//!     Arc::new(BrowserOpener),
//! );
//! let summary = Coordinator::new(Arc::new(strategy)).run(&mut tasks).await?;
//! println!("delivered {} of {}", summary.delivered_renamed, tasks.len());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod client;
pub mod coordinator;
pub mod extract;
pub mod models;
pub mod naming;
pub mod queue;
pub mod sheet;
pub mod strategy;

// Re-export main public API
pub use builder::build_tasks;
pub use client::{ClientConfig, DenialReason, DriveClient, RetrievalService, ServiceOutcome};
pub use coordinator::{Coordinator, CoordinatorConfig, RunSummary, TaskEvent};
pub use extract::extract_identifier;
pub use models::{DeliveryMethod, DownloadTask, SortKey, TaskStatus};
pub use queue::{TaskList, TaskStats};
pub use sheet::{parse_bytes, Row};
pub use strategy::{
    BrowserOpener, Delivery, DeliverySink, DirectorySink, DriveStrategy, FallbackOpener,
    RetrievalStrategy,
};
