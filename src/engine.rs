//! Engine assembly: turns a [`DraftlineConfig`] into a running
//! [`SessionController`], with every host-facing collaborator replaceable.

use crate::binder::{Synthesizer, TemplateBinder};
use crate::config::DraftlineConfig;
use crate::delivery::{Clock, DeliveryScheduler, TokioClock};
use crate::error::ApiError;
use crate::export::{
    default_download_dir, ClipboardSink, DirectorySink, DownloadSink, ExportAdapter,
    SystemClipboard,
};
use crate::session::SessionController;
use crate::template::TemplateRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

pub struct EngineBuilder {
    config: DraftlineConfig,
    template_base: PathBuf,
    clock: Option<Arc<dyn Clock>>,
    synthesizer: Option<Arc<dyn Synthesizer>>,
    clipboard: Option<Arc<dyn ClipboardSink>>,
    downloads: Option<Arc<dyn DownloadSink>>,
}

impl EngineBuilder {
    pub fn new(config: DraftlineConfig) -> Self {
        Self {
            config,
            template_base: PathBuf::from("."),
            clock: None,
            synthesizer: None,
            clipboard: None,
            downloads: None,
        }
    }

    /// Directory relative template override paths resolve against.
    pub fn with_template_base(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_base = dir.into();
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn Synthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn ClipboardSink>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn with_downloads(mut self, downloads: Arc<dyn DownloadSink>) -> Self {
        self.downloads = Some(downloads);
        self
    }

    pub fn config(&self) -> &DraftlineConfig {
        &self.config
    }

    /// Built-in templates with configured overrides applied.
    pub fn build_registry(&self) -> Result<TemplateRegistry, ApiError> {
        TemplateRegistry::builtin()?.with_overrides(&self.config.templates, &self.template_base)
    }

    pub fn build_exporter(&self) -> ExportAdapter {
        let clipboard: Arc<dyn ClipboardSink> = match &self.clipboard {
            Some(clipboard) => Arc::clone(clipboard),
            None => Arc::new(match &self.config.export.clipboard_command {
                Some(command) => SystemClipboard::with_command(command.clone()),
                None => SystemClipboard::detect(),
            }),
        };
        let downloads: Arc<dyn DownloadSink> = match &self.downloads {
            Some(downloads) => Arc::clone(downloads),
            None => {
                let dir = self
                    .config
                    .export
                    .download_dir
                    .clone()
                    .unwrap_or_else(default_download_dir);
                Arc::new(DirectorySink::new(dir))
            }
        };
        ExportAdapter::new(clipboard, downloads)
    }

    /// Validate the configuration and start a controller on the current tokio runtime.
    pub fn build(self) -> Result<SessionController, ApiError> {
        self.config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                messages.join("\n")
            ))
        })?;

        let registry = Arc::new(self.build_registry()?);
        let exporter = self.build_exporter();
        let settings = self.config.delivery.settings();
        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(TokioClock),
        };
        let synthesizer: Arc<dyn Synthesizer> = match self.synthesizer {
            Some(synthesizer) => synthesizer,
            None => Arc::new(TemplateBinder),
        };

        debug!(
            interval_ms = settings.interval.as_millis() as u64,
            chars_per_tick = settings.chars_per_tick,
            "Engine assembled"
        );
        Ok(SessionController::spawn(
            registry,
            synthesizer,
            DeliveryScheduler::new(clock, settings),
            exporter,
        ))
    }
}
