pub mod global_file;
pub mod workspace_file;

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};

/// `PLANWRIGHT__SECTION__KEY` overrides, applied last.
pub fn add_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("PLANWRIGHT")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("pipeline.strategies"),
    )
}
