//! CLI command-name contract used in log fields.

use crate::cli::parse::{CircuitCommands, Commands};

/// Dotted command name (e.g. "generate", "circuit.status").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Generate { .. } => "generate",
        Commands::Fallback { .. } => "fallback",
        Commands::Repair { .. } => "repair",
        Commands::Validate { .. } => "validate",
        Commands::Circuit { command } => match command {
            CircuitCommands::Status { .. } => "circuit.status",
            CircuitCommands::Clear => "circuit.clear",
        },
    }
}
