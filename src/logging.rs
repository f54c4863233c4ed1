//! Logging System
//!
//! Structured logging through `tracing`. Level, format and destination come
//! from, highest first: environment (`PLANWRIGHT_LOG`, `PLANWRIGHT_LOG_FORMAT`,
//! `PLANWRIGHT_LOG_OUTPUT`, `PLANWRIGHT_LOG_MODULES`), the `[logging]` config
//! section, then defaults. Logs go to stderr by default so JSON printed on
//! stdout stays machine-readable.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub const LOG_ENV: &str = "PLANWRIGHT_LOG";
pub const LOG_FORMAT_ENV: &str = "PLANWRIGHT_LOG_FORMAT";
pub const LOG_OUTPUT_ENV: &str = "PLANWRIGHT_LOG_OUTPUT";
pub const LOG_MODULES_ENV: &str = "PLANWRIGHT_LOG_MODULES";

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// json or text
    #[serde(default = "default_format")]
    pub format: String,

    /// stdout, stderr or file
    #[serde(default = "default_output")]
    pub output: String,

    /// Used when `output` is `file`.
    #[serde(default = "default_log_file")]
    pub file: PathBuf,

    /// Colored output (text format, terminal outputs only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Per-module levels, e.g. `planwright::generation = "debug"`.
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_log_file() -> PathBuf {
    directories::ProjectDirs::from("", "", "planwright")
        .map(|dirs| dirs.data_dir().join("planwright.log"))
        .unwrap_or_else(|| PathBuf::from(".planwright/planwright.log"))
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: default_log_file(),
            color: true,
            modules: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), String> {
        parse_format(&self.format).map_err(|e| e.to_string())?;
        parse_output(&self.output).map_err(|e| e.to_string())?;
        for (module, level) in &self.modules {
            format!("{}={}", module, level)
                .parse::<tracing_subscriber::filter::Directive>()
                .map_err(|e| format!("Invalid level for module '{}': {}", module, e))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogOutput {
    Stdout,
    Stderr,
    File,
}

fn parse_format(format: &str) -> Result<LogFormat, ApiError> {
    match format {
        "text" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        other => Err(ApiError::ConfigError(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            other
        ))),
    }
}

fn parse_output(output: &str) -> Result<LogOutput, ApiError> {
    match output {
        "stdout" => Ok(LogOutput::Stdout),
        "stderr" => Ok(LogOutput::Stderr),
        "file" => Ok(LogOutput::File),
        other => Err(ApiError::ConfigError(format!(
            "Invalid log output: {} (must be 'stdout', 'stderr' or 'file')",
            other
        ))),
    }
}

/// Effective settings after applying environment overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    filter: String,
    format: LogFormat,
    output: LogOutput,
}

fn resolve_settings(
    config: &LoggingConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<LogSettings, ApiError> {
    let filter = match env(LOG_ENV).filter(|v| !v.trim().is_empty()) {
        Some(spec) => spec,
        None => {
            let mut directives = vec![config.level.clone()];
            if config.level != "off" {
                directives.extend(config.modules.iter().map(|(m, l)| format!("{}={}", m, l)));
                if let Some(modules) = env(LOG_MODULES_ENV) {
                    directives.extend(
                        modules
                            .split(',')
                            .filter_map(|spec| spec.split_once('='))
                            .map(|(m, l)| format!("{}={}", m.trim(), l.trim())),
                    );
                }
            }
            directives.join(",")
        }
    };

    let format = match env(LOG_FORMAT_ENV) {
        Some(format) => parse_format(format.trim())?,
        None => parse_format(&config.format)?,
    };
    let output = match env(LOG_OUTPUT_ENV) {
        Some(output) => parse_output(output.trim())?,
        None => parse_output(&config.output)?,
    };

    Ok(LogSettings {
        filter,
        format,
        output,
    })
}

fn make_writer(output: LogOutput, file: &PathBuf) -> Result<BoxMakeWriter, ApiError> {
    Ok(match output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::File => {
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ApiError::ConfigError(format!("Failed to create log directory: {}", e))
                })?;
            }
            let handle = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .map_err(|e| {
                    ApiError::ConfigError(format!("Failed to open log file {:?}: {}", file, e))
                })?;
            BoxMakeWriter::new(Mutex::new(handle))
        }
    })
}

/// Install the global subscriber. `None` uses defaults.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), ApiError> {
    let defaults = LoggingConfig::default();
    let config = config.unwrap_or(&defaults);
    if !config.enabled {
        return Ok(());
    }

    let settings = resolve_settings(config, |name| std::env::var(name).ok())?;
    let filter = EnvFilter::try_new(&settings.filter)
        .map_err(|e| ApiError::ConfigError(format!("Invalid log filter: {}", e)))?;
    let writer = make_writer(settings.output, &config.file)?;
    let ansi = config.color && settings.output != LogOutput::File;

    let base_subscriber = Registry::default().with(filter);
    let installed = match settings.format {
        LogFormat::Json => base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init(),
        LogFormat::Text => base_subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .try_init(),
    };
    installed.map_err(|e| ApiError::ConfigError(format!("Failed to install logger: {}", e)))
}
