//! Planwright CLI Binary
//!
//! Command-line interface for the resilient plan generation pipeline.

use clap::Parser;
use planwright::cli::{Cli, RunContext};
use planwright::config::ConfigLoader;
use planwright::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);
    init_logging(Some(&logging_config))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Planwright CLI starting");

    let context = match RunContext::new(cli.workspace.clone(), cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error loading configuration: {}", e);
            eprintln!("{}", planwright::cli::map_error(&e));
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", planwright::cli::map_error(&e));
            process::exit(1);
        }
    }
}

/// Logging configuration from config files, overridden by CLI flags.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    if !cli.verbose && cli.log_level.is_none() {
        return LoggingConfig {
            level: "off".to_string(),
            ..LoggingConfig::default()
        };
    }

    let loaded = match cli.config {
        Some(ref path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(&cli.workspace),
    };
    let mut config = loaded.map(|c| c.logging).unwrap_or_default();

    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
    }
    config
}
