//! Per-task retrieval strategy
//!
//! One task goes through a primary, rename-capable fetch via the retrieval
//! service; a denial or any service-level fault is absorbed by falling back
//! to a direct open of the original reference in the platform browser. The
//! fallback outcome is unverifiable: browser-native navigation has access
//! the proxied path does not, and nothing reports back, so its
//! `delivered` acknowledgment is best-effort by design.
//!
//! Only two things surface as task errors: a retrieval target that does not
//! form a valid URL, and a delivery-sink fault after a successful fetch.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::app::client::{RetrievalService, ServiceOutcome};
use crate::app::models::{DeliveryMethod, DownloadTask};
use crate::app::naming;
use crate::constants::files;
use crate::errors::{DownloadError, DownloadResult};

/// Outcome of one strategy invocation; the strategy never reports a denial,
/// only a delivery (by either method) or an unexpected fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Which path satisfied the task
    pub method: DeliveryMethod,
    /// Final on-disk name for renamed deliveries; the fallback path cannot
    /// know the upstream-assigned name
    pub final_name: Option<String>,
}

/// Per-task retrieval contract consumed by the orchestrator
#[async_trait]
pub trait RetrievalStrategy: Send + Sync {
    async fn retrieve(&self, task: &DownloadTask) -> DownloadResult<Delivery>;
}

/// Destination for successfully fetched payloads
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Persist a payload under the corrected name, returning where it landed
    async fn deliver(&self, name: &str, payload: &[u8]) -> DownloadResult<PathBuf>;
}

/// Fire-and-forget opener for the fallback path
pub trait FallbackOpener: Send + Sync {
    /// Hand the original reference to an external navigator. No outcome is
    /// observable.
    fn open(&self, reference: &str);
}

/// Directory sink writing payloads with the atomic temp-file + rename
/// pattern, preventing partial files from interruptions
pub struct DirectorySink {
    directory: PathBuf,
}

impl DirectorySink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

#[async_trait]
impl DeliverySink for DirectorySink {
    async fn deliver(&self, name: &str, payload: &[u8]) -> DownloadResult<PathBuf> {
        tokio::fs::create_dir_all(&self.directory).await?;

        let destination = self.directory.join(name);
        let temp_path = temp_path_for(&destination);

        let mut file = File::create(&temp_path).await?;
        file.write_all(payload).await?;
        file.flush().await?;

        tokio::fs::rename(&temp_path, &destination).await.map_err(|_e| {
            DownloadError::AtomicOperationFailed {
                temp_path: temp_path.clone(),
                final_path: destination.clone(),
            }
        })?;

        info!("Saved {} ({} bytes)", destination.display(), payload.len());
        Ok(destination)
    }
}

fn temp_path_for(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(files::TEMP_FILE_SUFFIX);
    destination.with_file_name(name)
}

/// Opener launching the platform browser command, detached
pub struct BrowserOpener;

impl FallbackOpener for BrowserOpener {
    fn open(&self, reference: &str) {
        #[cfg(target_os = "linux")]
        let result = Command::new("xdg-open").arg(reference).spawn();
        #[cfg(target_os = "macos")]
        let result = Command::new("open").arg(reference).spawn();
        #[cfg(target_os = "windows")]
        let result = Command::new("cmd").args(["/C", "start", "", reference]).spawn();
        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        let result: std::io::Result<std::process::Child> = Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "no browser opener for this platform",
        ));

        match result {
            Ok(_) => debug!("Opened fallback reference in browser: {}", reference),
            Err(e) => warn!("Could not launch browser for {}: {}", reference, e),
        }
    }
}

/// Default strategy: rename-capable retrieval with browser-open fallback
pub struct DriveStrategy {
    service: Arc<dyn RetrievalService>,
    sink: Arc<dyn DeliverySink>,
    opener: Arc<dyn FallbackOpener>,
}

impl DriveStrategy {
    pub fn new(
        service: Arc<dyn RetrievalService>,
        sink: Arc<dyn DeliverySink>,
        opener: Arc<dyn FallbackOpener>,
    ) -> Self {
        Self {
            service,
            sink,
            opener,
        }
    }

    fn fall_back(&self, task: &DownloadTask) -> Delivery {
        self.opener.open(&task.original_reference);
        Delivery {
            method: DeliveryMethod::Fallback,
            final_name: None,
        }
    }
}

#[async_trait]
impl RetrievalStrategy for DriveStrategy {
    async fn retrieve(&self, task: &DownloadTask) -> DownloadResult<Delivery> {
        match self
            .service
            .fetch(&task.retrieval_target, &task.target_name)
            .await
        {
            Ok(ServiceOutcome::Delivered {
                payload,
                content_type,
                ..
            }) => {
                let corrected =
                    naming::apply_extension(&task.target_name, content_type.as_deref());
                let final_name = naming::strip_control(&corrected);

                // A sink fault here is an unexpected fault, not a denial
                self.sink.deliver(&final_name, &payload).await?;

                Ok(Delivery {
                    method: DeliveryMethod::Renamed,
                    final_name: Some(final_name),
                })
            }
            Ok(ServiceOutcome::Denied { status, reason }) => {
                debug!(
                    "Primary attempt denied for {} (status {}, {:?}); falling back",
                    task.identifier, status, reason
                );
                Ok(self.fall_back(task))
            }
            Err(DownloadError::InvalidUrl { url, error }) => {
                // Malformed identifier; nothing sensible to open either
                Err(DownloadError::InvalidUrl { url, error })
            }
            Err(e) => {
                warn!(
                    "Primary attempt failed for {} ({}); falling back",
                    task.identifier, e
                );
                Ok(self.fall_back(task))
            }
        }
    }
}
