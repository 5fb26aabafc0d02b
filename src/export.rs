//! Export Adapter
//!
//! Copies finished text to the clipboard or turns it into a downloadable
//! artifact. All host side effects of the engine live behind the two sink
//! traits here, so everything else stays pure and testable.

use crate::error::{ApiError, ExportError};
use crate::session::GenerationSession;
use crate::types::GenerationRequest;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

pub mod clipboard;
pub mod download;

pub use clipboard::{MemoryClipboard, SystemClipboard};
pub use download::{default_download_dir, DirectorySink, MemoryDownloads};

pub const DOWNLOAD_MIME_TYPE: &str = "text/markdown";
const DOWNLOAD_EXTENSION: &str = "md";

/// Destination of a clipboard copy.
pub trait ClipboardSink: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ExportError>;
}

/// Destination of a download artifact. Returns where the artifact landed.
pub trait DownloadSink: Send + Sync {
    fn save(&self, artifact: &DownloadArtifact) -> Result<PathBuf, ExportError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    Copy,
    Download,
}

impl FromStr for ExportKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "copy" => Ok(ExportKind::Copy),
            "download" => Ok(ExportKind::Download),
            other => Err(ApiError::ConfigError(format!(
                "Invalid export kind: {} (must be 'copy' or 'download')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Ok,
    ClipboardUnavailable(String),
}

/// A file ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub contents: String,
}

impl DownloadArtifact {
    pub fn byte_len(&self) -> usize {
        self.contents.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExportOutcome {
    Copied { bytes: usize },
    ClipboardUnavailable { reason: String },
    Downloaded { path: PathBuf, bytes: usize },
    NothingToExport,
}

impl fmt::Display for ExportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportOutcome::Copied { bytes } => write!(f, "Copied {} bytes to clipboard", bytes),
            ExportOutcome::ClipboardUnavailable { reason } => {
                write!(f, "Clipboard unavailable: {}", reason)
            }
            ExportOutcome::Downloaded { path, bytes } => {
                write!(f, "Saved {} bytes to {}", bytes, path.display())
            }
            ExportOutcome::NothingToExport => f.write_str("Nothing to export"),
        }
    }
}

/// Clipboard and download surfaces, injected at construction.
#[derive(Clone)]
pub struct ExportAdapter {
    clipboard: Arc<dyn ClipboardSink>,
    downloads: Arc<dyn DownloadSink>,
}

impl ExportAdapter {
    pub fn new(clipboard: Arc<dyn ClipboardSink>, downloads: Arc<dyn DownloadSink>) -> Self {
        Self {
            clipboard,
            downloads,
        }
    }

    /// Copy `text` to the clipboard. Failure is reported, never raised.
    pub fn copy_text(&self, text: &str) -> CopyOutcome {
        match self.clipboard.write_text(text) {
            Ok(()) => CopyOutcome::Ok,
            Err(e) => {
                warn!(error = %e, "Clipboard copy failed");
                let reason = match e {
                    ExportError::ClipboardUnavailable(reason) => reason,
                    other => other.to_string(),
                };
                CopyOutcome::ClipboardUnavailable(reason)
            }
        }
    }

    /// Describe a download of `text`. Pure; nothing is written.
    pub fn build_download(text: &str, suggested_name: &str) -> DownloadArtifact {
        DownloadArtifact {
            file_name: format!("{}.{}", slugify(suggested_name), DOWNLOAD_EXTENSION),
            mime_type: DOWNLOAD_MIME_TYPE,
            contents: text.to_string(),
        }
    }

    pub fn save_download(&self, artifact: &DownloadArtifact) -> Result<PathBuf, ExportError> {
        self.downloads.save(artifact)
    }

    /// Export whatever the session has delivered so far.
    pub fn export(
        &self,
        kind: ExportKind,
        session: &GenerationSession,
    ) -> Result<ExportOutcome, ExportError> {
        let text = session.delivered_text();
        if text.is_empty() {
            return Ok(ExportOutcome::NothingToExport);
        }

        match kind {
            ExportKind::Copy => Ok(match self.copy_text(text) {
                CopyOutcome::Ok => ExportOutcome::Copied { bytes: text.len() },
                CopyOutcome::ClipboardUnavailable(reason) => {
                    ExportOutcome::ClipboardUnavailable { reason }
                }
            }),
            ExportKind::Download => {
                let artifact = Self::build_download(text, &suggested_name(session.request()));
                let path = self.save_download(&artifact)?;
                info!(
                    session_id = %session.id(),
                    path = %path.display(),
                    bytes = artifact.byte_len(),
                    "Document saved"
                );
                Ok(ExportOutcome::Downloaded {
                    path,
                    bytes: artifact.byte_len(),
                })
            }
        }
    }
}

/// Default download name for a request: `<category>-<client>`.
pub fn suggested_name(request: &GenerationRequest) -> String {
    format!(
        "{}-{}",
        request.category.slug(),
        request.client().unwrap_or("document")
    )
}

/// Lowercase ASCII slug; runs of anything else collapse to a single `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("document");
    }
    slug
}
