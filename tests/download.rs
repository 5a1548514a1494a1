//! Batch retrieval tests against a mock Drive endpoint
//!
//! Exercises the service classification rules and the full orchestrated run:
//! delivered bytes land renamed in the output directory, denials fall back
//! to the opener, faults surface per task without halting the batch.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use drive_fetcher::app::{
    ClientConfig, Coordinator, CoordinatorConfig, DeliveryMethod, DenialReason, DirectorySink,
    DownloadTask, DriveClient, DriveStrategy, FallbackOpener, RetrievalService, ServiceOutcome,
    SortKey, TaskList, TaskStatus,
};

fn fast_client() -> DriveClient {
    // High rate limit keeps the governor out of the test's way
    let config = ClientConfig {
        rate_limit_rps: 1000,
        request_timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(5),
        ..ClientConfig::default()
    };
    DriveClient::with_config(&config).expect("client builds")
}

fn mock_task(identifier: &str, target_name: &str, server_uri: &str) -> DownloadTask {
    let mut task = DownloadTask::new(
        identifier,
        format!("https://drive.google.com/file/d/{}/view", identifier),
        target_name,
        2,
        SortKey {
            primary: target_name.to_string(),
            secondary: SortKey::epoch(),
        },
    );
    // Point the canonical target at the mock endpoint for the test
    task.retrieval_target = format!("{}/uc?export=download&id={}", server_uri, identifier);
    task
}

#[derive(Default)]
struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl FallbackOpener for RecordingOpener {
    fn open(&self, reference: &str) {
        self.opened.lock().unwrap().push(reference.to_string());
    }
}

#[tokio::test]
async fn service_classifies_served_bytes_as_delivered() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uc"))
        .and(query_param("id", "PDF1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"%PDF-1.4 fake".to_vec()),
        )
        .mount(&server)
        .await;

    let client = fast_client();
    let target = format!("{}/uc?export=download&id=PDF1", server.uri());

    match client.fetch(&target, "Report").await? {
        ServiceOutcome::Delivered {
            payload,
            content_type,
            disposition,
        } => {
            assert_eq!(payload, b"%PDF-1.4 fake".to_vec());
            assert_eq!(content_type.as_deref(), Some("application/pdf"));
            assert_eq!(disposition, "attachment; filename*=UTF-8''Report.pdf");
        }
        other => panic!("Expected Delivered, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn service_classifies_failure_status_as_denial() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = fast_client();
    let target = format!("{}/uc?export=download&id=PRIVATE", server.uri());

    match client.fetch(&target, "Secret").await? {
        ServiceOutcome::Denied { status, reason } => {
            assert_eq!(status, 403);
            assert_eq!(reason, DenialReason::Status);
        }
        other => panic!("Expected Denied, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn service_classifies_interstitial_page_as_denial() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string("<html>Sign in to continue</html>"),
        )
        .mount(&server)
        .await;

    let client = fast_client();
    let target = format!("{}/uc?export=download&id=GATED", server.uri());

    match client.fetch(&target, "Gated").await? {
        ServiceOutcome::Denied { status, reason } => {
            assert_eq!(status, 200);
            assert_eq!(reason, DenialReason::InterstitialPage);
        }
        other => panic!("Expected Denied, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn batch_run_saves_renamed_files_and_falls_back_on_denial() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("id", "OK1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"bytes-one".to_vec()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("id", "GATED"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<html>interstitial</html>"),
        )
        .mount(&server)
        .await;

    let output = tempfile::tempdir()?;
    let opener = Arc::new(RecordingOpener::default());

    let strategy = DriveStrategy::new(
        Arc::new(fast_client()),
        Arc::new(DirectorySink::new(output.path())),
        opener.clone(),
    );
    let coordinator = Coordinator::with_config(
        Arc::new(strategy),
        CoordinatorConfig {
            pacing: Duration::from_millis(1),
        },
    );

    let mut list = TaskList::from_tasks(vec![
        mock_task("OK1", "Alice - HQ - 01022020", &server.uri()),
        mock_task("GATED", "Bob - Depot - 02032021", &server.uri()),
    ]);

    let summary = coordinator.run(&mut list).await?;

    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.delivered_renamed, 1);
    assert_eq!(summary.delivered_fallback, 1);
    assert_eq!(summary.failed, 0);

    // Renamed delivery landed with the corrected extension
    let saved = output.path().join("Alice - HQ - 01022020.pdf");
    assert_eq!(std::fs::read(&saved)?, b"bytes-one");

    // Fallback opened the original sharing reference, not the derived target
    assert_eq!(
        *opener.opened.lock().unwrap(),
        vec!["https://drive.google.com/file/d/GATED/view".to_string()]
    );

    // Both tasks delivered from the user's perspective
    assert!(list.tasks().iter().all(|task| task.is_success()));
    assert_eq!(
        list.tasks()[0].method,
        Some(DeliveryMethod::Renamed)
    );
    assert_eq!(
        list.tasks()[1].method,
        Some(DeliveryMethod::Fallback)
    );
    Ok(())
}

#[tokio::test]
async fn rerun_skips_delivered_tasks_and_retries_failures() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("id", "OK1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/plain")
                .set_body_string("hello"),
        )
        .mount(&server)
        .await;

    let output = tempfile::tempdir()?;
    let opener = Arc::new(RecordingOpener::default());
    let strategy = Arc::new(DriveStrategy::new(
        Arc::new(fast_client()),
        Arc::new(DirectorySink::new(output.path())),
        opener.clone(),
    ));
    let coordinator = Coordinator::with_config(
        strategy,
        CoordinatorConfig {
            pacing: Duration::from_millis(1),
        },
    );

    // Second task carries a malformed target: an unexpected fault, not a denial
    let mut bad = mock_task("BAD", "Broken", &server.uri());
    bad.retrieval_target = "not a url".to_string();

    let mut list = TaskList::from_tasks(vec![
        mock_task("OK1", "Notes", &server.uri()),
        bad,
    ]);

    let first = coordinator.run(&mut list).await?;
    assert_eq!(first.delivered_renamed, 1);
    assert_eq!(first.failed, 1);
    assert_eq!(list.tasks()[1].status, TaskStatus::Error);

    // Re-invoking attempts only the failed task
    let second = coordinator.run(&mut list).await?;
    assert_eq!(second.skipped, 1);
    assert_eq!(second.attempted, 1);
    assert_eq!(second.failed, 1);

    // The text payload got its generic extension and survived the re-run
    let saved: PathBuf = output.path().join("Notes.txt");
    assert!(saved.exists());

    // Faults never reach the opener
    assert!(opener.opened.lock().unwrap().is_empty());
    Ok(())
}
