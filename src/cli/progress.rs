//! Progress display for batch runs
//!
//! A single indicatif bar driven by the orchestrator's task events. One task
//! is in flight at a time, so the bar tracks positions, the message tracks
//! the current file, and terminal outcomes tick the counter.

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::app::{DeliveryMethod, TaskEvent};

/// Progress reporter consuming task events until the channel closes
pub struct ProgressReporter {
    handle: JoinHandle<()>,
}

impl ProgressReporter {
    /// Spawn a reporter for `total` tasks reading from `rx`
    pub fn spawn(total: usize, mut rx: mpsc::Receiver<TaskEvent>) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .expect("progress template is valid")
                .progress_chars("=> "),
        );

        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    TaskEvent::Started {
                        target_name,
                        source_row,
                        ..
                    } => {
                        bar.set_message(format!("row {}: {}", source_row, target_name));
                    }
                    TaskEvent::Delivered { identifier, method } => {
                        bar.inc(1);
                        let note = match method {
                            DeliveryMethod::Renamed => "saved",
                            DeliveryMethod::Fallback => "opened in browser",
                        };
                        bar.println(format!("✓ {} ({})", identifier, note));
                    }
                    TaskEvent::Failed { identifier, error } => {
                        bar.inc(1);
                        bar.println(format!("✗ {}: {}", identifier, error));
                    }
                }
            }
            bar.finish_and_clear();
        });

        Self { handle }
    }

    /// Wait for the event stream to drain after the run finishes
    pub async fn finish(self) {
        let _ = self.handle.await;
    }
}
