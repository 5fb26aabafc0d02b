//! Integration tests for the session controller lifecycle

use super::test_utils::Harness;
use draftline::binder::{bind, Synthesizer};
use draftline::error::{ApiError, BindError};
use draftline::session::{ErrorKind, SessionStatus};
use draftline::template::{Template, TemplateRegistry};
use draftline::types::{DocumentCategory, GenerationRequest, SessionId};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn acme_proposal() -> GenerationRequest {
    GenerationRequest::new(
        DocumentCategory::Proposal,
        Some("Acme".to_string()),
        "Redesign homepage",
    )
}

struct FailingSynthesizer;

impl Synthesizer for FailingSynthesizer {
    fn synthesize(&self, _: &Template, _: &GenerationRequest) -> Result<String, BindError> {
        Err(BindError::Synthesis("model offline".to_string()))
    }
}

struct EmptySynthesizer;

impl Synthesizer for EmptySynthesizer {
    fn synthesize(&self, _: &Template, _: &GenerationRequest) -> Result<String, BindError> {
        Ok(String::new())
    }
}

#[tokio::test]
async fn test_proposal_streams_to_completion() {
    let harness = Harness::new(4);
    let request = acme_proposal();
    let id = harness.controller.submit(request.clone()).await.unwrap();

    let session = harness.run_to_completion().await;

    let registry = TemplateRegistry::builtin().unwrap();
    let expected = bind(registry.lookup(DocumentCategory::Proposal), &request);
    assert_eq!(session.id(), &id);
    assert_eq!(session.status(), SessionStatus::Completed);
    assert_eq!(session.full_text(), expected);
    assert_eq!(session.delivered_text(), expected);
    assert!(session.delivered_text().starts_with("# Project Proposal for Acme"));
    assert!(session.delivered_text().contains("Redesign homepage"));
    assert!(session.error().is_none());
}

#[tokio::test]
async fn test_empty_details_fail_without_ticking() {
    let harness = Harness::new(1);
    let request = GenerationRequest::new(DocumentCategory::Email, None, "   \n\t");
    harness.controller.submit(request).await.unwrap();

    let session = harness.controller.wait_until_settled().await.unwrap();

    assert_eq!(session.status(), SessionStatus::Failed);
    assert_eq!(session.error().unwrap().kind, ErrorKind::EmptyInput);
    assert_eq!(session.delivered_text(), "");
    assert!(!session.is_synthesized());
    assert!(!session.is_fully_delivered());
    assert_eq!(harness.clock.ticks_requested(), 0);
}

#[tokio::test]
async fn test_synthesis_error_fails_session() {
    let harness =
        Harness::with_builder(1, |builder| builder.with_synthesizer(Arc::new(FailingSynthesizer)));
    harness.controller.submit(acme_proposal()).await.unwrap();

    let session = harness.controller.wait_until_settled().await.unwrap();

    assert_eq!(session.status(), SessionStatus::Failed);
    let error = session.error().unwrap();
    assert_eq!(error.kind, ErrorKind::BindFailed);
    assert!(error.message.contains("model offline"));
    assert_eq!(harness.clock.ticks_requested(), 0);
}

#[tokio::test]
async fn test_empty_document_completes_immediately() {
    let harness =
        Harness::with_builder(1, |builder| builder.with_synthesizer(Arc::new(EmptySynthesizer)));
    harness.controller.submit(acme_proposal()).await.unwrap();

    let session = harness.controller.wait_until_settled().await.unwrap();

    assert_eq!(session.status(), SessionStatus::Completed);
    assert_eq!(session.full_text(), "");
    assert!(session.is_fully_delivered());
    assert_eq!(harness.clock.ticks_requested(), 0);
}

#[tokio::test]
async fn test_cancel_freezes_delivered_text() {
    let harness = Harness::new(1);
    let id = harness.controller.submit(acme_proposal()).await.unwrap();

    harness.clock.advance(3);
    harness.wait_for_delivered(3).await;
    let cancelled = harness.controller.cancel().await.unwrap();
    assert_eq!(cancelled, Some(id));

    let at_cancel = harness.controller.current().await.unwrap().unwrap();
    assert_eq!(at_cancel.status(), SessionStatus::Cancelled);
    assert_eq!(at_cancel.delivered_text(), "# P");

    harness.clock.advance(1_000);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let later = harness.controller.current().await.unwrap().unwrap();
    assert_eq!(later.status(), SessionStatus::Cancelled);
    assert_eq!(later.delivered_text(), "# P");
}

#[tokio::test]
async fn test_cancel_without_active_session_is_noop() {
    let harness = Harness::new(1);
    assert_eq!(harness.controller.cancel().await.unwrap(), None);

    harness.controller.submit(acme_proposal()).await.unwrap();
    harness.run_to_completion().await;
    assert_eq!(harness.controller.cancel().await.unwrap(), None);
    assert_eq!(
        harness.controller.status().await.unwrap(),
        SessionStatus::Completed
    );
}

#[tokio::test]
async fn test_new_submission_preempts_active_session() {
    let harness = Harness::new(1);
    let events: Arc<Mutex<Vec<(SessionId, SessionStatus, usize)>>> =
        Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    harness
        .controller
        .on_update(move |session| {
            sink.lock().unwrap().push((
                session.id().clone(),
                session.status(),
                session.delivered_len(),
            ));
        })
        .unwrap();

    let first = harness.controller.submit(acme_proposal()).await.unwrap();
    harness.clock.advance(2);
    harness.wait_for_delivered(2).await;

    let second_request = GenerationRequest::new(
        DocumentCategory::Email,
        Some("Globex".to_string()),
        "Quarterly report",
    );
    let second = harness.controller.submit(second_request).await.unwrap();
    assert_ne!(first, second);

    let settled = harness.run_to_completion().await;
    assert_eq!(settled.id(), &second);
    assert_eq!(settled.status(), SessionStatus::Completed);
    assert!(settled.delivered_text().starts_with("Subject:"));
    assert!(settled.delivered_text().contains("Dear Globex,"));

    let events = events.lock().unwrap();
    let cancel_at = events
        .iter()
        .position(|(id, status, _)| id == &first && *status == SessionStatus::Cancelled)
        .expect("first session is cancelled");
    assert_eq!(events[cancel_at].2, 2);
    assert_eq!(events[cancel_at + 1].0, second);
    assert_eq!(events[cancel_at + 1].2, 0);
    assert!(events[cancel_at + 1..].iter().all(|(id, _, _)| id == &second));
    assert!(events[..cancel_at].iter().all(|(id, _, _)| id == &first));
}

#[tokio::test]
async fn test_observed_text_is_always_a_growing_prefix() {
    let harness = Harness::new(3);
    let snapshots = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&snapshots);
    harness
        .controller
        .on_update(move |session| {
            sink.lock().unwrap().push((
                session.status(),
                session.delivered_text().to_string(),
                session.full_text().to_string(),
                session.is_fully_delivered(),
            ));
        })
        .unwrap();

    let request = GenerationRequest::new(
        DocumentCategory::Estimate,
        Some("Café Müller".to_string()),
        "Menu boards • signage",
    );
    harness.controller.submit(request).await.unwrap();
    harness.run_to_completion().await;

    let snapshots = snapshots.lock().unwrap();
    assert_eq!(snapshots[0].0, SessionStatus::Validating);
    let mut previous = 0;
    for (status, delivered, full, fully_delivered) in snapshots.iter() {
        assert_eq!(*fully_delivered, *status == SessionStatus::Completed);
        assert!(full.starts_with(delivered.as_str()));
        assert!(delivered.len() >= previous);
        previous = delivered.len();
    }
    let (status, delivered, full, _) = snapshots.last().unwrap();
    assert_eq!(*status, SessionStatus::Completed);
    assert_eq!(delivered, full);
}

#[tokio::test]
async fn test_resubmit_after_completion_starts_new_session() {
    let harness = Harness::new(8);
    let first = harness.controller.submit(acme_proposal()).await.unwrap();
    let done = harness.run_to_completion().await;
    assert_eq!(done.id(), &first);

    let second = harness.controller.submit(acme_proposal()).await.unwrap();
    assert_ne!(first, second);
    let current = harness.controller.current().await.unwrap().unwrap();
    assert_eq!(current.id(), &second);

    let done_again = harness.run_to_completion().await;
    assert_eq!(done_again.id(), &second);
    assert_eq!(done_again.status(), SessionStatus::Completed);
    assert_eq!(done_again.full_text(), done.full_text());
}

#[tokio::test]
async fn test_reset_returns_to_idle() {
    let harness = Harness::new(1);
    harness.controller.submit(acme_proposal()).await.unwrap();
    harness.clock.advance(1);
    harness.wait_for_delivered(1).await;

    harness.controller.reset().await.unwrap();

    assert!(harness.controller.current().await.unwrap().is_none());
    assert_eq!(harness.controller.status().await.unwrap(), SessionStatus::Idle);
    assert!(harness.controller.subscribe().borrow().is_none());
}

#[tokio::test]
async fn test_wait_until_settled_while_idle_returns_immediately() {
    let harness = Harness::new(1);
    assert!(matches!(
        harness.controller.wait_until_settled().await,
        Err(ApiError::NoActiveSession)
    ));

    harness.controller.submit(acme_proposal()).await.unwrap();
    harness.controller.reset().await.unwrap();

    let waited = tokio::time::timeout(
        Duration::from_millis(500),
        harness.controller.wait_until_settled(),
    )
    .await
    .expect("returns without a new submission");
    assert!(matches!(waited, Err(ApiError::NoActiveSession)));
}

#[tokio::test]
async fn test_shutdown_closes_controller() {
    let harness = Harness::new(1);
    harness.controller.shutdown().await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(harness.controller.submit(acme_proposal()).await.is_err());
}
