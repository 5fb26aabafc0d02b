//! CLI route: single route table and run context. Dispatches to the engine and presentation.

use crate::cli::command_name;
use crate::cli::parse::{Commands, ConfigCommands};
use crate::cli::presentation::{
    format_categories_json, format_categories_text, format_session_summary_json,
    format_session_summary_text, format_template_text, format_validation_result_json,
    format_validation_result_text,
};
use crate::config::{ConfigLoader, DraftlineConfig};
use crate::engine::EngineBuilder;
use crate::error::ApiError;
use crate::export::{ExportKind, ExportOutcome};
use crate::session::{GenerationSession, SessionController, SessionStatus};
use crate::types::{DocumentCategory, GenerationRequest, SessionId};
use futures::{Stream, StreamExt};
use std::io::{IsTerminal, Read, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runtime context for CLI execution: workspace, config path and the loaded configuration.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config_path: Option<PathBuf>,
    config: DraftlineConfig,
}

/// Borrowed arguments of `draftline generate`.
struct GenerateArgs<'a> {
    category: &'a str,
    client: Option<&'a str>,
    details: Option<&'a str>,
    use_example: bool,
    copy: bool,
    download: bool,
    download_dir: Option<&'a PathBuf>,
    interval_ms: Option<u64>,
    json: bool,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self {
            workspace_root,
            config_path,
            config,
        })
    }

    pub fn config(&self) -> &DraftlineConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let name = command_name(command);
        debug!(command = %name, "Command started");
        let result = self.execute_inner(command).await;
        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(command = %name, duration_ms, "Command finished"),
            Err(e) => warn!(command = %name, duration_ms, error = %e, "Command failed"),
        }
        result
    }

    async fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Generate {
                category,
                client,
                details,
                use_example,
                copy,
                download,
                download_dir,
                interval_ms,
                format,
            } => {
                self.handle_generate(GenerateArgs {
                    category,
                    client: client.as_deref(),
                    details: details.as_deref(),
                    use_example: *use_example,
                    copy: *copy,
                    download: *download,
                    download_dir: download_dir.as_ref(),
                    interval_ms: *interval_ms,
                    json: format == "json",
                })
                .await
            }
            Commands::Categories { format } => {
                if format == "json" {
                    Ok(format_categories_json())
                } else {
                    Ok(format_categories_text())
                }
            }
            Commands::Template { category } => {
                let category: DocumentCategory = category.parse()?;
                let registry = self.engine(self.config.clone()).build_registry()?;
                Ok(format_template_text(registry.lookup(category)))
            }
            Commands::Config { command } => self.handle_config_command(command),
        }
    }

    fn handle_config_command(&self, command: &ConfigCommands) -> Result<String, ApiError> {
        match command {
            ConfigCommands::Validate { format } => {
                let result = self.config.validate();
                if format == "json" {
                    Ok(format_validation_result_json(&result))
                } else {
                    Ok(format_validation_result_text(&result))
                }
            }
            ConfigCommands::Show => toml::to_string_pretty(&self.config)
                .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e))),
        }
    }

    async fn handle_generate(&self, args: GenerateArgs<'_>) -> Result<String, ApiError> {
        let category: DocumentCategory = args.category.parse()?;
        let details = resolve_details(category, args.details, args.use_example)?;

        let mut config = self.config.clone();
        if let Some(interval_ms) = args.interval_ms {
            config.delivery.interval_ms = interval_ms;
        }
        if let Some(dir) = args.download_dir {
            config.export.download_dir = Some(dir.clone());
        }

        let controller = self.engine(config).build()?;
        // Subscribe before submitting so no snapshot of the new session is missed.
        let updates = controller.updates();
        let request = GenerationRequest::new(category, args.client.map(str::to_string), details);
        let id = controller.submit(request).await?;

        let session = tokio::select! {
            settled = stream_delivery(updates, &id, !args.json) => settled?,
            _ = tokio::signal::ctrl_c() => {
                controller.cancel().await?;
                println!();
                current_session(&controller).await?
            }
        };

        let result = self.finish_generate(&controller, &session, &args).await;
        controller.shutdown().await?;
        result
    }

    async fn finish_generate(
        &self,
        controller: &SessionController,
        session: &GenerationSession,
        args: &GenerateArgs<'_>,
    ) -> Result<String, ApiError> {
        match session.status() {
            SessionStatus::Completed => {}
            SessionStatus::Cancelled => {
                return Err(ApiError::GenerationFailed(format!(
                    "session {} cancelled after {} of {} bytes",
                    session.id(),
                    session.delivered_len(),
                    session.full_text().len()
                )))
            }
            _ => {
                let message = session
                    .error()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| format!("session ended as {}", session.status()));
                return Err(ApiError::GenerationFailed(message));
            }
        }

        let mut exports: Vec<ExportOutcome> = Vec::new();
        if args.copy {
            exports.push(controller.export_current(ExportKind::Copy).await?);
        }
        if args.download {
            exports.push(controller.export_current(ExportKind::Download).await?);
        }

        if args.json {
            Ok(format_session_summary_json(session, &exports))
        } else {
            Ok(format!("\n{}", format_session_summary_text(session, &exports)))
        }
    }

    fn engine(&self, config: DraftlineConfig) -> EngineBuilder {
        EngineBuilder::new(config).with_template_base(ConfigLoader::template_base(
            &self.workspace_root,
            self.config_path.as_deref(),
        ))
    }
}

/// Project details from flags, an interactive prompt, or piped stdin.
fn resolve_details(
    category: DocumentCategory,
    details: Option<&str>,
    use_example: bool,
) -> Result<String, ApiError> {
    if use_example {
        return Ok(category.example_prompt().to_string());
    }
    if let Some(details) = details {
        return Ok(details.to_string());
    }

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        use dialoguer::Input;

        return Input::<String>::new()
            .with_prompt(format!("Project details ({})", category.label()))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| ApiError::ConfigError(format!("Failed to get user input: {}", e)));
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Follow `updates` for session `id`, echoing each newly delivered suffix to
/// stdout, until the session is terminal.
async fn stream_delivery<S>(
    updates: S,
    id: &SessionId,
    echo: bool,
) -> Result<GenerationSession, ApiError>
where
    S: Stream<Item = GenerationSession>,
{
    let mut updates = std::pin::pin!(updates);
    let mut stdout = std::io::stdout();
    let mut printed = 0;

    while let Some(session) = updates.next().await {
        if session.id() != id {
            continue;
        }
        if echo {
            let delivered = session.delivered_text();
            if delivered.len() > printed {
                stdout.write_all(delivered[printed..].as_bytes())?;
                stdout.flush()?;
                printed = delivered.len();
            }
        }
        if session.is_terminal() {
            if echo && printed > 0 {
                writeln!(stdout)?;
            }
            return Ok(session);
        }
    }
    Err(ApiError::ControllerClosed)
}

async fn current_session(controller: &SessionController) -> Result<GenerationSession, ApiError> {
    controller.current().await?.ok_or(ApiError::ControllerClosed)
}
