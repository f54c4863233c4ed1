//! Prompt text and function schemas for each strategy.

use crate::generation::request::GenerationRequest;
use crate::provider::FunctionSpec;
use serde_json::{json, Value};

pub const PLAN_FUNCTION_NAME: &str = "emit_activity_plan";

pub const SYSTEM_PROMPT: &str = "You are a certified fitness coach who designs safe, \
practical weekly training plans. Respond only with the requested data.";

/// Short preference summary shared by every prompt.
pub fn describe_request(request: &GenerationRequest) -> String {
    let mut lines = vec![
        format!("- Training days per week: {}", request.day_count()),
        format!("- Session length: {} minutes", request.session_minutes),
        format!("- Experience level: {}", request.difficulty),
    ];
    if !request.focus.is_empty() {
        lines.push(format!("- Focus areas: {}", request.focus.join(", ")));
    }
    if !request.equipment.is_empty() {
        lines.push(format!("- Available equipment: {}", request.equipment.join(", ")));
    }
    if !request.constraints.is_empty() {
        lines.push(format!("- Constraints: {}", request.constraints.join("; ")));
    }
    lines.join("\n")
}

pub fn function_call_prompt(request: &GenerationRequest) -> String {
    format!(
        "Design a training plan for this person and return it by calling `{}`.\n{}",
        PLAN_FUNCTION_NAME,
        describe_request(request)
    )
}

pub fn structured_prompt(request: &GenerationRequest) -> String {
    format!(
        "Design a training plan for this person.\n{}\n\n\
         Return a single JSON object and nothing else, shaped like:\n\
         {{\"schedule\": [{{\"label\": \"Day 1\", \"focus\": \"...\", \"items\": \
         [{{\"name\": \"...\", \"sets\": 3, \"repetitions\": 10, \"restUnits\": 60, \"notes\": \"...\"}}]}}],\n\
          \"prepSteps\": [\"...\"], \"windDownSteps\": [\"...\"],\n\
          \"progressionNotes\": {{\"period2\": \"...\", \"period3\": \"...\", \"period4\": \"...\"}},\n\
          \"recommendedFocusAreas\": [\"...\"]}}\n\
         The schedule must contain exactly {} entries. restUnits is rest in seconds.",
        describe_request(request),
        request.day_count()
    )
}

/// Prompt for a single day of a decomposed plan (`day_number` is 1-based).
pub fn day_prompt(request: &GenerationRequest, day_number: usize, previous_focus: &[String]) -> String {
    let previous = if previous_focus.is_empty() {
        String::new()
    } else {
        format!(
            "\nEarlier days already cover: {}. Choose a complementary focus.",
            previous_focus.join(", ")
        )
    };
    format!(
        "Design day {} of a {}-day training week for this person.\n{}{}\n\n\
         Return one JSON object and nothing else:\n\
         {{\"label\": \"Day {}\", \"focus\": \"...\", \"items\": \
         [{{\"name\": \"...\", \"sets\": 3, \"repetitions\": 10, \"restUnits\": 60}}]}}",
        day_number,
        request.day_count(),
        describe_request(request),
        previous,
        day_number
    )
}

pub fn simplified_prompt(request: &GenerationRequest) -> String {
    format!(
        "List a {}-day training week for a {} trainee{}.\n\
         Reply with JSON only: {{\"schedule\": [{{\"focus\": \"...\", \"items\": \
         [{{\"name\": \"...\", \"reps\": 10}}]}}]}}",
        request.day_count(),
        request.difficulty,
        if request.focus.is_empty() {
            String::new()
        } else {
            format!(" focusing on {}", request.focus.join(", "))
        }
    )
}

fn item_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "sets": {"type": "integer", "minimum": 0},
            "repetitions": {"type": "integer", "minimum": 0},
            "restUnits": {"type": "integer", "minimum": 0, "description": "Rest in seconds"},
            "notes": {"type": "string"}
        },
        "required": ["name", "repetitions", "restUnits"]
    })
}

/// Function definition whose arguments are a full plan.
pub fn plan_function(request: &GenerationRequest) -> FunctionSpec {
    let days = request.day_count();
    FunctionSpec {
        name: PLAN_FUNCTION_NAME.to_string(),
        description: "Return the complete multi-day training plan.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "schedule": {
                    "type": "array",
                    "minItems": days,
                    "maxItems": days,
                    "items": {
                        "type": "object",
                        "properties": {
                            "label": {"type": "string"},
                            "focus": {"type": "string"},
                            "items": {"type": "array", "minItems": 1, "items": item_schema()}
                        },
                        "required": ["label", "focus", "items"]
                    }
                },
                "prepSteps": {"type": "array", "items": {"type": "string"}},
                "windDownSteps": {"type": "array", "items": {"type": "string"}},
                "progressionNotes": {
                    "type": "object",
                    "properties": {
                        "period2": {"type": "string"},
                        "period3": {"type": "string"},
                        "period4": {"type": "string"}
                    }
                },
                "recommendedFocusAreas": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["schedule", "prepSteps", "windDownSteps", "progressionNotes"]
        }),
    }
}
