//! CLI presentation: text and json formatters per command family.

mod circuit;
mod plan;
mod shared;

pub use circuit::{format_circuit_status_json, format_circuit_status_text};
pub use plan::{format_outcome_json, format_outcome_text, format_plan_json, format_plan_text};
pub use shared::format_validation_report_text;
pub(crate) use shared::use_color;
