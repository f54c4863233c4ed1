//! Global config file source: $XDG_CONFIG_HOME/planwright/config.toml or ~/.config/planwright/config.toml

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::PathBuf;
use tracing::debug;

/// Path to global config file.
pub fn global_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("planwright").join("config.toml"))
}

/// Add global config file source to builder if it exists.
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if let Some(path) = global_config_path() {
        if path.exists() {
            let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
            builder = builder.add_source(File::from(canonical).required(false));
        } else {
            debug!(
                config_path = %path.display(),
                "No user-level configuration file, using defaults"
            );
        }
    }
    Ok(builder)
}
