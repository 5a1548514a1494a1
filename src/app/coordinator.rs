//! Sequential retrieval orchestration
//!
//! Drives every not-yet-delivered task through the retrieval strategy,
//! strictly one in flight, with a fixed pacing pause between attempts. The
//! pacing respects client-side burst limits on triggered transfers; the
//! per-request rate limit lives in the service, not here.
//!
//! The orchestrator may be invoked repeatedly on the same list ("retry
//! all"): delivered tasks are skipped entirely, so re-runs only attempt the
//! idle and failed subset.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::app::models::DeliveryMethod;
use crate::app::queue::TaskList;
use crate::app::strategy::RetrievalStrategy;
use crate::constants::limits;
use crate::errors::DownloadResult;

/// Configuration for a batch run
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Pause between consecutive task attempts
    pub pacing: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            pacing: limits::PACING_DELAY,
        }
    }
}

/// Status transition notifications emitted while a run progresses
#[derive(Debug, Clone)]
pub enum TaskEvent {
    /// Task moved to processing, immediately before the strategy runs
    Started {
        identifier: String,
        target_name: String,
        source_row: usize,
    },
    /// Task delivered, by either method
    Delivered {
        identifier: String,
        method: DeliveryMethod,
    },
    /// Task hit an unexpected fault
    Failed { identifier: String, error: String },
}

/// Outcome counts for one orchestrator invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Tasks the strategy was invoked for
    pub attempted: usize,
    /// Delivered through the rename-capable path
    pub delivered_renamed: usize,
    /// Delivered through the fallback path (best-effort acknowledgment)
    pub delivered_fallback: usize,
    /// Tasks that ended in an unexpected fault
    pub failed: usize,
    /// Tasks already delivered before the run started
    pub skipped: usize,
}

/// Sequential batch orchestrator
pub struct Coordinator {
    strategy: Arc<dyn RetrievalStrategy>,
    config: CoordinatorConfig,
    progress_tx: Option<mpsc::Sender<TaskEvent>>,
}

impl Coordinator {
    /// Create an orchestrator with default pacing
    pub fn new(strategy: Arc<dyn RetrievalStrategy>) -> Self {
        Self::with_config(strategy, CoordinatorConfig::default())
    }

    /// Create an orchestrator with custom configuration
    pub fn with_config(strategy: Arc<dyn RetrievalStrategy>, config: CoordinatorConfig) -> Self {
        Self {
            strategy,
            config,
            progress_tx: None,
        }
    }

    /// Attach a progress channel; events mirror every status transition
    pub fn with_progress(mut self, progress_tx: mpsc::Sender<TaskEvent>) -> Self {
        self.progress_tx = Some(progress_tx);
        self
    }

    /// Drive every pending task to a terminal state, in list order.
    ///
    /// Task-level faults never halt the run; the returned summary and the
    /// mutated list carry the per-task outcomes. `Err` is reserved for
    /// bookkeeping faults that indicate a bug, not for retrieval failures.
    pub async fn run(&self, list: &mut TaskList) -> DownloadResult<RunSummary> {
        let mut pending: VecDeque<usize> = list.pending_positions().into();
        let mut summary = RunSummary {
            skipped: list.len() - pending.len(),
            ..RunSummary::default()
        };

        info!(
            "Starting batch run: {} pending, {} already delivered",
            pending.len(),
            summary.skipped
        );

        while let Some(position) = pending.pop_front() {
            let task = list
                .get(position)
                .expect("pending positions index the same list")
                .clone();

            list.mark_processing(&task.identifier)?;
            self.emit(TaskEvent::Started {
                identifier: task.identifier.clone(),
                target_name: task.target_name.clone(),
                source_row: task.source_row,
            })
            .await;

            summary.attempted += 1;
            match self.strategy.retrieve(&task).await {
                Ok(delivery) => {
                    list.mark_success(&task.identifier, delivery.method)?;
                    match delivery.method {
                        DeliveryMethod::Renamed => summary.delivered_renamed += 1,
                        DeliveryMethod::Fallback => summary.delivered_fallback += 1,
                    }
                    debug!("Task {} delivered via {}", task.identifier, delivery.method);
                    self.emit(TaskEvent::Delivered {
                        identifier: task.identifier.clone(),
                        method: delivery.method,
                    })
                    .await;
                }
                Err(e) => {
                    list.mark_error(&task.identifier)?;
                    summary.failed += 1;
                    warn!("Task {} failed: {}", task.identifier, e);
                    self.emit(TaskEvent::Failed {
                        identifier: task.identifier.clone(),
                        error: e.to_string(),
                    })
                    .await;
                }
            }

            // Pace between attempts; nothing to wait for after the last one
            if !pending.is_empty() {
                tokio::time::sleep(self.config.pacing).await;
            }
        }

        info!(
            "Batch run finished: {} attempted, {} renamed, {} fallback, {} failed, {} skipped",
            summary.attempted,
            summary.delivered_renamed,
            summary.delivered_fallback,
            summary.failed,
            summary.skipped
        );
        Ok(summary)
    }

    async fn emit(&self, event: TaskEvent) {
        if let Some(tx) = &self.progress_tx {
            // A dropped receiver only means nobody is watching
            let _ = tx.send(event).await;
        }
    }
}
