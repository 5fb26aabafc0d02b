//! Per-workspace overrides, layered over the user's global draftline config.
//!
//! A workspace may carry `config/config.toml` (shared delivery pacing, export
//! directory, template overrides) and a profile file selected by
//! `DRAFTLINE_ENV`, e.g. `config/demo.toml` for slower delivery in a demo.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::{Path, PathBuf};

/// Selects the profile file under `config/`.
pub const PROFILE_ENV_VAR: &str = "DRAFTLINE_ENV";
const DEFAULT_PROFILE: &str = "development";

/// Workspace files in the order they are layered; later files win.
pub fn profile_files(workspace_root: &Path, profile: &str) -> [PathBuf; 2] {
    let config_dir = workspace_root.join("config");
    [
        config_dir.join("config.toml"),
        config_dir.join(format!("{}.toml", profile)),
    ]
}

/// Layer whichever workspace files exist onto `builder`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let profile =
        std::env::var(PROFILE_ENV_VAR).unwrap_or_else(|_| DEFAULT_PROFILE.to_string());

    let builder = profile_files(workspace_root, &profile)
        .into_iter()
        .filter(|path| path.exists())
        .fold(builder, |builder, path| {
            builder.add_source(File::from(path).required(false))
        });

    Ok(builder)
}
