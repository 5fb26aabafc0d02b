//! Generation sessions: one end-to-end attempt to synthesize and deliver a
//! document for a single request.

use crate::types::{GenerationRequest, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

mod controller;

pub use controller::{SessionController, UpdateCallback};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Validating,
    Generating,
    Completed,
    Cancelled,
    Failed,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Validating => "validating",
            SessionStatus::Generating => "generating",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Cancelled | SessionStatus::Failed
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a session failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Project details were empty after trimming.
    EmptyInput,
    /// The synthesizer could not produce text.
    BindFailed,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::EmptyInput => "empty_input",
            ErrorKind::BindFailed => "bind_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

/// Snapshot of a session. Cloning is cheap: the request and full text are shared.
///
/// The delivered text is stored as a length into `full_text`, so it is a prefix
/// of the full text by construction. `full_text` is `None` until synthesis has
/// produced a document; sessions that fail before that point never have one.
/// `status == Completed` exactly when [`is_fully_delivered`] holds.
///
/// [`is_fully_delivered`]: GenerationSession::is_fully_delivered
#[derive(Debug, Clone)]
pub struct GenerationSession {
    id: SessionId,
    request: Arc<GenerationRequest>,
    status: SessionStatus,
    full_text: Option<Arc<str>>,
    delivered_len: usize,
    error: Option<SessionError>,
    started_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GenerationSession {
    pub(crate) fn new(request: Arc<GenerationRequest>) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            request,
            status: SessionStatus::Validating,
            full_text: None,
            delivered_len: 0,
            error: None,
            started_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// The synthesized document, or `""` before synthesis.
    pub fn full_text(&self) -> &str {
        self.full_text.as_deref().unwrap_or("")
    }

    pub fn delivered_text(&self) -> &str {
        &self.full_text()[..self.delivered_len]
    }

    /// True once synthesis has produced the full text.
    pub fn is_synthesized(&self) -> bool {
        self.full_text.is_some()
    }

    /// True when a synthesized document has been delivered in full.
    pub fn is_fully_delivered(&self) -> bool {
        self.is_synthesized() && self.delivered_len == self.full_text().len()
    }

    pub fn delivered_len(&self) -> usize {
        self.delivered_len
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Fraction of the full text delivered, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        let total = self.full_text().len();
        if total == 0 {
            return if self.status == SessionStatus::Completed { 1.0 } else { 0.0 };
        }
        self.delivered_len as f64 / total as f64
    }

    pub(crate) fn begin_generating(&mut self, full_text: Arc<str>) {
        self.full_text = Some(full_text);
        self.delivered_len = 0;
        self.status = SessionStatus::Generating;
        self.touch();
    }

    /// Record delivery up to byte offset `end`. Returns true if the buffer grew.
    ///
    /// Ignored unless the session is generating and `end` extends the current
    /// prefix on a char boundary. Reaching the full length completes the session.
    pub(crate) fn advance_to(&mut self, end: usize) -> bool {
        let total = self.full_text().len();
        if self.status != SessionStatus::Generating
            || end <= self.delivered_len
            || end > total
            || !self.full_text().is_char_boundary(end)
        {
            return false;
        }
        self.delivered_len = end;
        if self.delivered_len == total {
            self.status = SessionStatus::Completed;
        }
        self.touch();
        true
    }

    pub(crate) fn complete(&mut self) {
        if self.status == SessionStatus::Generating {
            self.delivered_len = self.full_text().len();
            self.status = SessionStatus::Completed;
            self.touch();
        }
    }

    pub(crate) fn cancel(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = SessionStatus::Cancelled;
        self.touch();
        true
    }

    pub(crate) fn fail(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.status = SessionStatus::Failed;
        self.error = Some(SessionError {
            kind,
            message: message.into(),
        });
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
