//! Merge rules: defaults first, then files, then environment.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    // Lists stay out of here so a file-supplied list replaces the default
    // instead of merging with it; serde defaults cover them.
    Config::builder()
        .set_default("pipeline.call_timeout_ms", 30_000)?
        .set_default("pipeline.retry.max_attempts", 2)?
        .set_default("pipeline.retry.delay_ms", 750)?
        .set_default("pipeline.circuit_ttl_secs", 900)?
        .set_default("provider.provider_type", "openai")?
        .set_default("logging.level", "info")
}
