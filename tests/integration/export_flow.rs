//! Integration tests for exporting session text

use super::test_utils::Harness;
use draftline::engine::EngineBuilder;
use draftline::config::DraftlineConfig;
use draftline::delivery::ManualClock;
use draftline::export::{
    DirectorySink, ExportKind, ExportOutcome, MemoryClipboard, MemoryDownloads,
};
use draftline::session::SessionStatus;
use draftline::types::{DocumentCategory, GenerationRequest};
use std::sync::Arc;
use tempfile::TempDir;

fn acme_estimate() -> GenerationRequest {
    GenerationRequest::new(
        DocumentCategory::Estimate,
        Some("Acme Corp".to_string()),
        "Mobile app MVP",
    )
}

#[tokio::test]
async fn test_export_without_session_has_nothing() {
    let harness = Harness::new(1);
    let outcome = harness
        .controller
        .export_current(ExportKind::Copy)
        .await
        .unwrap();
    assert_eq!(outcome, ExportOutcome::NothingToExport);
    assert!(harness.clipboard.contents().is_none());
}

#[tokio::test]
async fn test_copy_and_download_completed_document() {
    let harness = Harness::new(16);
    harness.controller.submit(acme_estimate()).await.unwrap();
    let session = harness.run_to_completion().await;
    let bytes = session.full_text().len();

    let copied = harness
        .controller
        .export_current(ExportKind::Copy)
        .await
        .unwrap();
    assert_eq!(copied, ExportOutcome::Copied { bytes });
    assert_eq!(
        harness.clipboard.contents().as_deref(),
        Some(session.full_text())
    );

    let downloaded = harness
        .controller
        .export_current(ExportKind::Download)
        .await
        .unwrap();
    match downloaded {
        ExportOutcome::Downloaded { bytes: saved, .. } => assert_eq!(saved, bytes),
        other => panic!("unexpected outcome: {:?}", other),
    }
    let saved = harness.downloads.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].file_name, "estimate-acme-corp.md");
    assert_eq!(saved[0].mime_type, "text/markdown");
    assert_eq!(saved[0].contents, session.full_text());

    assert_eq!(
        harness.controller.status().await.unwrap(),
        SessionStatus::Completed
    );
}

#[tokio::test]
async fn test_export_after_cancel_uses_partial_text() {
    let harness = Harness::new(1);
    harness.controller.submit(acme_estimate()).await.unwrap();
    harness.clock.advance(5);
    harness.wait_for_delivered(5).await;
    harness.controller.cancel().await.unwrap();

    let outcome = harness
        .controller
        .export_current(ExportKind::Copy)
        .await
        .unwrap();

    assert_eq!(outcome, ExportOutcome::Copied { bytes: 5 });
    assert_eq!(harness.clipboard.contents().as_deref(), Some("# Pro"));
    assert_eq!(
        harness.controller.status().await.unwrap(),
        SessionStatus::Cancelled
    );
}

#[tokio::test]
async fn test_unavailable_clipboard_is_reported() {
    let harness = Harness::with_builder(32, |builder| {
        builder.with_clipboard(Arc::new(MemoryClipboard::unavailable()))
    });
    harness.controller.submit(acme_estimate()).await.unwrap();
    harness.run_to_completion().await;

    let outcome = harness
        .controller
        .export_current(ExportKind::Copy)
        .await
        .unwrap();
    assert!(matches!(outcome, ExportOutcome::ClipboardUnavailable { .. }));
}

#[tokio::test]
async fn test_directory_downloads_do_not_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new());
    let controller = EngineBuilder::new(DraftlineConfig::default())
        .with_clock(clock.clone())
        .with_clipboard(Arc::new(MemoryClipboard::new()))
        .with_downloads(Arc::new(DirectorySink::new(temp_dir.path())))
        .build()
        .unwrap();

    controller.submit(acme_estimate()).await.unwrap();
    clock.advance(1_000_000);
    let session = controller.wait_until_settled().await.unwrap();

    let mut paths = Vec::new();
    for _ in 0..2 {
        match controller.export_current(ExportKind::Download).await.unwrap() {
            ExportOutcome::Downloaded { path, .. } => paths.push(path),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    assert_eq!(paths[0].file_name().unwrap(), "estimate-acme-corp.md");
    assert_eq!(paths[1].file_name().unwrap(), "estimate-acme-corp-1.md");
    for path in &paths {
        assert_eq!(std::fs::read_to_string(path).unwrap(), session.full_text());
    }
}

#[test]
fn test_memory_downloads_default_is_empty() {
    assert!(MemoryDownloads::new().saved().is_empty());
}
