//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::cli::presentation::format_validation_report_text;
use crate::error::ApiError;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::ProviderNotConfigured(msg) => format!(
            "{}\n\nConfigure [provider] in config/config.toml or set the provider API key.",
            msg
        ),
        ApiError::InvalidPlan(report) => format!(
            "Plan failed validation.\n{}",
            format_validation_report_text(report)
        ),
        other => other.to_string(),
    }
}
