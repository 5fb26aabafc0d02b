//! Config loading entry points.

use super::merge;
use super::sources::{environment, global_file, workspace_file};
use super::DraftlineConfig;
use crate::error::ApiError;
use config::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads [`DraftlineConfig`] from layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, global file, workspace files and environment overrides.
    pub fn load(workspace_root: &Path) -> Result<DraftlineConfig, ApiError> {
        let builder = merge::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);

        let config: DraftlineConfig = builder.build()?.try_deserialize()?;
        debug!(workspace = %workspace_root.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load a single explicit file on top of defaults. Environment overrides
    /// still apply; global and workspace files are skipped.
    pub fn load_from_file(path: &Path) -> Result<DraftlineConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = merge::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true));
        let builder = environment::add_to_builder(builder);

        let config: DraftlineConfig = builder.build()?.try_deserialize()?;
        debug!(config_path = %path.display(), "Configuration loaded from file");
        Ok(config)
    }

    /// Directory that relative template paths resolve against.
    pub fn template_base(workspace_root: &Path, config_path: Option<&Path>) -> PathBuf {
        config_path
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| workspace_root.to_path_buf())
    }
}
