//! CLI domain: parse, route, help, output, and presentation only.
//! No pipeline logic; a single route table dispatches to the generation services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{CircuitCommands, Cli, Commands, PreferenceArgs};
pub use presentation::{
    format_circuit_status_json, format_circuit_status_text, format_outcome_json,
    format_outcome_text, format_plan_json, format_plan_text, format_validation_report_text,
};
pub use route::RunContext;
