//! Plan presentation: one table per day plus prep, wind-down and progression sections.

use super::shared::{banner, heading};
use crate::error::ApiError;
use crate::generation::{PlanOutcome, ValidatedPlan};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

pub fn format_plan_text(plan: &ValidatedPlan, color: bool) -> String {
    let mut sections = Vec::new();

    for day in &plan.schedule {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["Item", "Sets", "Reps", "Rest", "Notes"]);
        for item in &day.items {
            table.add_row(vec![
                item.name.clone(),
                item.sets.to_string(),
                item.repetitions.to_string(),
                format!("{}s", item.rest_units),
                item.notes.clone().unwrap_or_default(),
            ]);
        }
        sections.push(format!(
            "{}\n{}",
            heading(&format!("{} - {}", day.label, day.focus), color),
            table
        ));
    }

    sections.push(bullets(&heading("Prep", color), &plan.prep_steps));
    sections.push(bullets(&heading("Wind-down", color), &plan.wind_down_steps));

    let notes = &plan.progression_notes;
    sections.push(format!(
        "{}\n  Week 2: {}\n  Week 3: {}\n  Week 4: {}",
        heading("Progression", color),
        notes.period2,
        notes.period3,
        notes.period4
    ));

    if !plan.recommended_focus_areas.is_empty() {
        sections.push(bullets(
            &heading("Recommended focus", color),
            &plan.recommended_focus_areas,
        ));
    }

    sections.join("\n\n")
}

fn bullets(title: &str, lines: &[String]) -> String {
    let mut out = title.to_string();
    for line in lines {
        out.push_str(&format!("\n  - {}", line));
    }
    out
}

pub fn format_outcome_text(outcome: &PlanOutcome, color: bool) -> String {
    let header = match (outcome.message(), outcome.strategy()) {
        (Some(message), _) => banner(message, color),
        (None, Some(strategy)) => format!("Generated with {}", strategy),
        (None, None) => String::new(),
    };
    format!("{}\n\n{}", header, format_plan_text(outcome.plan(), color))
}

pub fn format_plan_json(plan: &ValidatedPlan) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(plan)?)
}

pub fn format_outcome_json(outcome: &PlanOutcome) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(outcome)?)
}
