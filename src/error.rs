//! Error types for the Draftline document synthesis engine.

use std::path::PathBuf;
use thiserror::Error;

/// Template binding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("Unknown placeholder: {{{{{0}}}}}")]
    UnknownPlaceholder(String),

    #[error("Unterminated placeholder starting at byte {offset}")]
    UnterminatedPlaceholder { offset: usize },

    #[error("Unbalanced section: {0}")]
    UnbalancedSection(String),

    #[error("Synthesis failed: {0}")]
    Synthesis(String),
}

/// Export-related errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    #[error("Failed to write {path:?}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Engine-level errors that are propagated to the caller rather than
/// recorded on a session.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unknown document category: {0}")]
    UnknownCategory(String),

    #[error("Invalid template for '{category}': {message}")]
    TemplateError { category: String, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Session controller is no longer running")]
    ControllerClosed,

    #[error("No active session")]
    NoActiveSession,

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
