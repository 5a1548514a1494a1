//! Data models for Drive Fetcher
//!
//! This module defines the core data structures used throughout the
//! application: the download task, its lifecycle status, the delivery method
//! recorded on success, and the build-time sort key.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::drive;

/// Lifecycle state of a download task
///
/// Transitions are monotonic per task: `Idle → Processing → {Success, Error}`.
/// Only the orchestrator mutates status, and a task that reached `Success`
/// is never re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created by the task builder, not yet attempted
    Idle,
    /// Retrieval attempt currently in flight
    Processing,
    /// Delivered, by either method
    Success,
    /// Unexpected fault; eligible for a later retry pass
    Error,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TaskStatus::Idle => "idle",
            TaskStatus::Processing => "processing",
            TaskStatus::Success => "success",
            TaskStatus::Error => "error",
        };
        write!(f, "{}", label)
    }
}

/// Which retrieval path satisfied a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// Rename-capable retrieval through the proxy service
    Renamed,
    /// Direct open of the original reference; filename kept upstream-assigned
    Fallback,
}

impl std::fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DeliveryMethod::Renamed => "renamed",
            DeliveryMethod::Fallback => "fallback",
        };
        write!(f, "{}", label)
    }
}

/// Build-time ordering key for a task
///
/// Primary compares case-insensitively; ties break on the secondary date,
/// where rows without a parseable date carry the epoch origin and therefore
/// sort earliest. The key is computed once by the builder and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Name-like cell value, or the target name when no name column matched
    pub primary: String,
    /// Parsed date cell, or the epoch origin for undated rows
    pub secondary: NaiveDate,
}

impl SortKey {
    /// Epoch origin used as the secondary key for undated rows
    pub fn epoch() -> NaiveDate {
        NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch origin is a valid date")
    }

    /// Comparison tuple: lowercased primary, then chronological secondary.
    /// The raw primary is a last tiebreak so ordering stays consistent with
    /// equality.
    fn cmp_key(&self) -> (String, NaiveDate, &str) {
        (self.primary.to_lowercase(), self.secondary, &self.primary)
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.cmp_key().cmp(&other.cmp_key())
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// One unit of retrieval work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadTask {
    /// Stable key extracted from the upstream reference; unique within a list
    pub identifier: String,
    /// Raw matched reference string, preserved verbatim for display and fallback
    pub original_reference: String,
    /// Canonical upstream address derived from the identifier
    pub retrieval_target: String,
    /// Proposed output filename, extension not guaranteed
    pub target_name: String,
    /// 1-based row position in the original input (header row counted)
    pub source_row: usize,
    /// Build-time ordering key
    pub sort_key: SortKey,
    /// Lifecycle state, mutated only by the orchestrator
    pub status: TaskStatus,
    /// Strategy that satisfied the task, set on success
    pub method: Option<DeliveryMethod>,
}

impl DownloadTask {
    /// Create a new idle task for an extracted reference
    pub fn new(
        identifier: impl Into<String>,
        original_reference: impl Into<String>,
        target_name: impl Into<String>,
        source_row: usize,
        sort_key: SortKey,
    ) -> Self {
        let identifier = identifier.into();
        let retrieval_target = format!("{}{}", drive::DOWNLOAD_URL_PREFIX, identifier);
        Self {
            identifier,
            original_reference: original_reference.into(),
            retrieval_target,
            target_name: target_name.into(),
            source_row,
            sort_key,
            status: TaskStatus::Idle,
            method: None,
        }
    }

    /// Check whether this task already delivered its file
    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Success
    }
}
