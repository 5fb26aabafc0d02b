//! Configuration System
//!
//! Layered configuration for delivery pacing, export targets, template
//! overrides and logging. Sources merge in order: defaults, the global config
//! file, workspace config files, then `DRAFTLINE__*` environment variables.

use crate::delivery::DeliverySettings;
use crate::logging::LoggingConfig;
use crate::template::TemplateSource;
use crate::types::DocumentCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Longest accepted inter-chunk interval.
const MAX_INTERVAL_MS: u64 = 60_000;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftlineConfig {
    /// Delivery pacing
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Clipboard and download settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Per-category template overrides, keyed by category slug
    #[serde(default)]
    pub templates: BTreeMap<String, TemplateSource>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Minimum milliseconds between chunks
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Characters emitted per chunk
    #[serde(default = "default_chars_per_tick")]
    pub chars_per_tick: usize,
}

fn default_interval_ms() -> u64 {
    5
}

fn default_chars_per_tick() -> usize {
    1
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            chars_per_tick: default_chars_per_tick(),
        }
    }
}

impl DeliveryConfig {
    pub fn settings(&self) -> DeliverySettings {
        DeliverySettings {
            interval: Duration::from_millis(self.interval_ms),
            chars_per_tick: self.chars_per_tick.max(1),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.chars_per_tick == 0 {
            return Err("chars_per_tick must be at least 1".to_string());
        }
        if self.interval_ms > MAX_INTERVAL_MS {
            return Err(format!(
                "interval_ms must be at most {} (got {})",
                MAX_INTERVAL_MS, self.interval_ms
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory downloads are written to (default: the user's Downloads folder)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,

    /// Clipboard helper command line (default: auto-detected)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clipboard_command: Option<Vec<String>>,
}

impl ExportConfig {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(command) = &self.clipboard_command {
            if command.first().map_or(true, |program| program.trim().is_empty()) {
                return Err("clipboard_command must name a program".to_string());
            }
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Delivery(String),
    Export(String),
    Template(String, String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Delivery(msg) => write!(f, "Delivery: {}", msg),
            ValidationError::Export(msg) => write!(f, "Export: {}", msg),
            ValidationError::Template(name, msg) => write!(f, "Template '{}': {}", name, msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl DraftlineConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.delivery.validate() {
            errors.push(ValidationError::Delivery(e));
        }

        if let Err(e) = self.export.validate() {
            errors.push(ValidationError::Export(e));
        }

        for (name, source) in &self.templates {
            if let Err(e) = name.parse::<DocumentCategory>() {
                errors.push(ValidationError::Template(name.clone(), e.to_string()));
            }
            match (&source.body, &source.path) {
                (Some(_), Some(_)) => errors.push(ValidationError::Template(
                    name.clone(),
                    "set either 'body' or 'path', not both".to_string(),
                )),
                (None, None) => errors.push(ValidationError::Template(
                    name.clone(),
                    "one of 'body' or 'path' is required".to_string(),
                )),
                _ => {}
            }
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
