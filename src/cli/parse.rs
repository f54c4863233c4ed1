//! CLI parse: clap types for Planwright. No behavior beyond mapping flags to a request.

use crate::generation::{Difficulty, GenerationRequest};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Planwright CLI - resilient activity plan generation
#[derive(Parser)]
#[command(name = "planwright")]
#[command(about = "Generate multi-day activity plans from an unreliable language model")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (when output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full generation pipeline
    Generate {
        #[command(flatten)]
        preferences: PreferenceArgs,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the deterministic template plan without calling a model
    Fallback {
        #[command(flatten)]
        preferences: PreferenceArgs,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Recover a JSON document from raw model output
    Repair {
        /// Input file (reads stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Validate and normalize a plan document
    Validate {
        /// Plan document (raw model output is accepted)
        file: PathBuf,
        /// Requested days per week
        #[arg(long, default_value = "3")]
        frequency: u32,
        /// beginner, intermediate or advanced
        #[arg(long, default_value = "beginner")]
        difficulty: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Inspect or clear the rate-limit circuit
    Circuit {
        #[command(subcommand)]
        command: CircuitCommands,
    },
}

#[derive(Subcommand)]
pub enum CircuitCommands {
    /// Show whether upstream calls are currently suppressed
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Clear a tripped circuit
    Clear,
}

/// Preference flags shared by `generate` and `fallback`.
#[derive(Args, Debug, Clone)]
pub struct PreferenceArgs {
    /// Days per week
    #[arg(long, default_value = "3")]
    pub frequency: u32,

    /// Focus tags (repeat or comma-separate)
    #[arg(long, value_delimiter = ',')]
    pub focus: Vec<String>,

    /// beginner, intermediate or advanced
    #[arg(long, default_value = "beginner")]
    pub difficulty: String,

    /// Session length in minutes
    #[arg(long, default_value = "45")]
    pub minutes: u32,

    /// Available equipment (repeat or comma-separate)
    #[arg(long, value_delimiter = ',')]
    pub equipment: Vec<String>,

    /// Free-form constraint, e.g. an injury to work around (repeatable)
    #[arg(long)]
    pub constraint: Vec<String>,
}

impl PreferenceArgs {
    pub fn to_request(&self) -> GenerationRequest {
        GenerationRequest {
            frequency: self.frequency,
            session_minutes: self.minutes,
            focus: trimmed(&self.focus),
            difficulty: Difficulty::parse_lenient(&self.difficulty),
            equipment: trimmed(&self.equipment),
            constraints: trimmed(&self.constraint),
        }
    }
}

fn trimmed(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
