//! Entry points for building a [`PlanwrightConfig`] from layered sources.

use super::merge;
use super::sources;
use super::PlanwrightConfig;
use crate::error::ApiError;
use config::File;
use std::path::Path;
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, then the global file, then workspace files, then environment.
    pub fn load(workspace_root: &Path) -> Result<PlanwrightConfig, ApiError> {
        let builder = merge::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = sources::add_environment(builder);

        let config: PlanwrightConfig = builder.build()?.try_deserialize()?;
        debug!(workspace = %workspace_root.display(), "Configuration loaded");
        Ok(config)
    }

    /// Defaults overlaid with one explicit file. Environment still applies.
    pub fn load_from_file(path: &Path) -> Result<PlanwrightConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        let builder = merge::builder_with_defaults()?.add_source(File::from(path).required(true));
        let builder = sources::add_environment(builder);
        Ok(builder.build()?.try_deserialize()?)
    }
}
