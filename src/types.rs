//! Core request types shared across the engine.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Document category. The set is closed; every member has exactly one template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    Proposal,
    Email,
    Estimate,
}

impl DocumentCategory {
    pub const ALL: [DocumentCategory; 3] = [
        DocumentCategory::Proposal,
        DocumentCategory::Email,
        DocumentCategory::Estimate,
    ];

    /// Stable index into per-category tables.
    pub(crate) fn index(self) -> usize {
        match self {
            DocumentCategory::Proposal => 0,
            DocumentCategory::Email => 1,
            DocumentCategory::Estimate => 2,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            DocumentCategory::Proposal => "proposal",
            DocumentCategory::Email => "email",
            DocumentCategory::Estimate => "estimate",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentCategory::Proposal => "Proposal",
            DocumentCategory::Email => "Email",
            DocumentCategory::Estimate => "Estimate",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DocumentCategory::Proposal => "Professional project proposals",
            DocumentCategory::Email => "Business communication",
            DocumentCategory::Estimate => "Project cost estimates",
        }
    }

    /// Sample project description offered to users who want to try a category.
    pub fn example_prompt(self) -> &'static str {
        match self {
            DocumentCategory::Proposal => {
                "Create a proposal for a website redesign project for a local bakery. \
                 The project includes homepage, menu page, and contact form."
            }
            DocumentCategory::Email => {
                "Write a follow-up email to a client about a pending project approval. \
                 Keep it professional but friendly."
            }
            DocumentCategory::Estimate => {
                "Generate an estimate for building a mobile app with user authentication, \
                 push notifications, and payment integration."
            }
        }
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for DocumentCategory {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DocumentCategory::ALL
            .into_iter()
            .find(|c| c.slug().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ApiError::UnknownCategory(s.to_string()))
    }
}

/// A single user submission. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub category: DocumentCategory,
    pub client_name: Option<String>,
    pub project_details: String,
}

impl GenerationRequest {
    pub fn new(
        category: DocumentCategory,
        client_name: Option<String>,
        project_details: impl Into<String>,
    ) -> Self {
        Self {
            category,
            client_name,
            project_details: project_details.into(),
        }
    }

    /// Client name if one was given and is not blank.
    pub fn client(&self) -> Option<&str> {
        self.client_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// True when the project details are non-empty after trimming.
    pub fn has_details(&self) -> bool {
        !self.project_details.trim().is_empty()
    }
}

/// Identifier of one generation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        let ts = now_millis();
        let pid = std::process::id();
        let seq = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("sess-{ts}-{pid}-{seq}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
