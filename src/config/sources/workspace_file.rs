//! Workspace config files: `config/config.toml`, then `config/{PLANWRIGHT_ENV}.toml`

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ENV_NAME_VAR: &str = "PLANWRIGHT_ENV";

const DEFAULT_ENV_NAME: &str = "development";

/// Candidate files in load order; later files override earlier ones.
pub fn workspace_config_files(workspace_root: &Path, env_name: &str) -> [PathBuf; 2] {
    let dir = workspace_root.join("config");
    [dir.join("config.toml"), dir.join(format!("{}.toml", env_name))]
}

/// Layer the workspace files that exist onto `builder`.
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let env_name = std::env::var(ENV_NAME_VAR)
        .ok()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENV_NAME.to_string());

    for path in workspace_config_files(workspace_root, &env_name) {
        if path.is_file() {
            debug!(config_path = %path.display(), env = %env_name, "Layering workspace configuration");
            builder = builder.add_source(File::from(path).required(false));
        }
    }
    Ok(builder)
}
