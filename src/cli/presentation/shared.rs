//! Shared presentation helpers: headings, color policy, validation reports.

use crate::generation::ValidationReport;
use owo_colors::OwoColorize;
use std::io::IsTerminal;

/// Color only when stdout is a terminal and NO_COLOR is unset.
pub(crate) fn use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

/// Section heading, bold and underlined when color is on.
pub(crate) fn heading(title: &str, color: bool) -> String {
    if color {
        format!("{}", title.bold().underline())
    } else {
        title.to_string()
    }
}

/// Warning banner shown above template plans.
pub(crate) fn banner(message: &str, color: bool) -> String {
    let text = format!("! {}", message);
    if color {
        format!("{}", text.yellow().bold())
    } else {
        text
    }
}

pub fn format_validation_report_text(report: &ValidationReport) -> String {
    if report.is_empty() {
        return "No defects found.".to_string();
    }
    let mut out = format!("Defects ({}):", report.defects.len());
    for defect in &report.defects {
        out.push_str(&format!("\n  - {}", defect));
    }
    out
}
