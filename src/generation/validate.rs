//! Schema Validator & Normalizer
//!
//! Converts a [`CandidateDocument`] into a [`ValidatedPlan`], or explains why
//! it cannot. Rules run in a fixed order:
//!
//! 1. alias mapping (legacy and alternate field names onto canonical ones);
//! 2. required-field check (fatal, every defect is reported);
//! 3. numeric coercion with difficulty-keyed defaults;
//! 4. optional-field completion with static defaults;
//! 5. structural completion to exactly the requested number of days.
//!
//! Rest precedence: a numeric `restUnits` (or its `restSeconds` alias) wins;
//! a `rest` duration string is parsed only when no usable numeric value
//! exists; otherwise the difficulty default applies.

use crate::generation::plan::{DayEntry, ItemEntry, ProgressionNotes, ValidatedPlan};
use crate::generation::repair::CandidateDocument;
use crate::generation::request::{Difficulty, GenerationRequest};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

const TOP_LEVEL_ALIASES: &[(&str, &[&str])] = &[
    ("recommendedFocusAreas", &["recommendations", "recommended_focus_areas"]),
    ("prepSteps", &["warmUp", "warmup", "warm_up", "prep_steps"]),
    ("windDownSteps", &["coolDown", "cooldown", "cool_down", "wind_down_steps"]),
    ("progressionNotes", &["progression", "progression_notes"]),
    ("schedule", &["days", "plan", "workouts"]),
];

const DAY_ALIASES: &[(&str, &[&str])] = &[
    ("label", &["day", "name", "title"]),
    ("focus", &["focusArea", "focus_area", "type", "muscleGroups"]),
    ("items", &["exercises", "activities"]),
];

const ITEM_ALIASES: &[(&str, &[&str])] = &[
    ("name", &["exercise", "title", "activity"]),
    ("repetitions", &["reps"]),
    ("restUnits", &["restSeconds", "rest_seconds", "rest_units"]),
    ("notes", &["note", "tips", "cue"]),
];

const PROGRESSION_ALIASES: &[(&str, &[&str])] = &[
    ("period2", &["week2", "week_2", "phase2"]),
    ("period3", &["week3", "week_3", "phase3"]),
    ("period4", &["week4", "week_4", "phase4"]),
];

/// Keys that may wrap the real document one level down.
const WRAPPER_KEYS: &[&str] = &["plan", "workoutPlan", "data", "result"];

pub const DEFAULT_PREP_STEPS: &[&str] = &[
    "5 minutes of light cardio to raise your heart rate",
    "Dynamic mobility for hips, shoulders and spine",
    "One easy warm-up set of the first exercise",
];

pub const DEFAULT_WIND_DOWN_STEPS: &[&str] = &[
    "3 to 5 minutes of easy walking",
    "Static stretches for the muscles you trained, 30 seconds each",
    "Slow breathing for one minute",
];

pub const DEFAULT_PROGRESSION: [&str; 3] = [
    "Add one or two repetitions to each set while keeping good form.",
    "Add one set to your main exercises or increase the load slightly.",
    "Take an easier week: reduce sets by a third, then reassess.",
];

/// Target shape parameters derived from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanSchema {
    pub day_count: usize,
    pub difficulty: Difficulty,
}

impl PlanSchema {
    pub fn for_request(request: &GenerationRequest) -> Self {
        Self {
            day_count: request.day_count(),
            difficulty: request.difficulty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DefectKind {
    Missing,
    WrongType { expected: &'static str },
    Empty,
}

/// One missing or invalid required field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Defect {
    pub path: String,
    #[serde(flatten)]
    pub kind: DefectKind,
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DefectKind::Missing => write!(f, "{}: missing", self.path),
            DefectKind::WrongType { expected } => write!(f, "{}: expected {}", self.path, expected),
            DefectKind::Empty => write!(f, "{}: empty", self.path),
        }
    }
}

/// Every required-field defect found in a rejected candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub defects: Vec<Defect>,
}

impl ValidationReport {
    fn push(&mut self, path: impl Into<String>, kind: DefectKind) {
        self.defects.push(Defect {
            path: path.into(),
            kind,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.defects.is_empty()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.defects.iter().map(|d| d.path.as_str()).collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.defects.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Validate and normalize a candidate against the plan schema.
pub fn validate_plan(
    doc: &CandidateDocument,
    schema: &PlanSchema,
) -> Result<ValidatedPlan, ValidationReport> {
    let mut root = match doc {
        Value::Object(map) => unwrap_nested(map.clone()),
        // A bare array is read as the schedule itself.
        Value::Array(days) => {
            let mut map = Map::new();
            map.insert("schedule".to_string(), Value::Array(days.clone()));
            map
        }
        _ => {
            let mut report = ValidationReport::default();
            report.push("$", DefectKind::WrongType { expected: "object" });
            return Err(report);
        }
    };

    apply_aliases(&mut root, TOP_LEVEL_ALIASES);

    let raw_days = check_required(&root)?;

    let mut schedule: Vec<DayEntry> = raw_days
        .iter()
        .enumerate()
        .map(|(index, day)| normalize_day(index, day, schema.difficulty))
        .collect();

    complete_schedule(&mut schedule, schema.day_count);

    Ok(ValidatedPlan {
        schedule,
        prep_steps: string_list(root.get("prepSteps"))
            .unwrap_or_else(|| owned(DEFAULT_PREP_STEPS)),
        wind_down_steps: string_list(root.get("windDownSteps"))
            .unwrap_or_else(|| owned(DEFAULT_WIND_DOWN_STEPS)),
        progression_notes: progression_notes(root.get("progressionNotes")),
        recommended_focus_areas: string_list(root.get("recommendedFocusAreas"))
            .unwrap_or_default(),
    })
}

fn unwrap_nested(map: Map<String, Value>) -> Map<String, Value> {
    if map.contains_key("schedule") {
        return map;
    }
    for key in WRAPPER_KEYS {
        if let Some(Value::Object(inner)) = map.get(*key) {
            if inner.contains_key("schedule") || inner.contains_key("days") {
                return inner.clone();
            }
        }
    }
    map
}

/// Copy the first present alias into the canonical key when it is absent.
fn apply_aliases(map: &mut Map<String, Value>, table: &[(&str, &[&str])]) {
    for (canonical, aliases) in table {
        if map.contains_key(*canonical) {
            continue;
        }
        if let Some(value) = aliases.iter().find_map(|alias| map.get(*alias)).cloned() {
            map.insert((*canonical).to_string(), value);
        }
    }
}

/// Rule 2. Returns the alias-mapped day objects, or every defect found.
fn check_required(root: &Map<String, Value>) -> Result<Vec<Map<String, Value>>, ValidationReport> {
    let mut report = ValidationReport::default();

    let days = match root.get("schedule") {
        None | Some(Value::Null) => {
            report.push("schedule", DefectKind::Missing);
            return Err(report);
        }
        Some(Value::Array(days)) if days.is_empty() => {
            report.push("schedule", DefectKind::Empty);
            return Err(report);
        }
        Some(Value::Array(days)) => days,
        Some(_) => {
            report.push("schedule", DefectKind::WrongType { expected: "array" });
            return Err(report);
        }
    };

    let mut normalized = Vec::with_capacity(days.len());
    for (d, day) in days.iter().enumerate() {
        let path = format!("schedule[{}]", d);
        let Value::Object(day) = day else {
            report.push(path, DefectKind::WrongType { expected: "object" });
            continue;
        };
        let mut day = day.clone();
        apply_aliases(&mut day, DAY_ALIASES);

        match day.get("items") {
            None | Some(Value::Null) => report.push(format!("{}.items", path), DefectKind::Missing),
            Some(Value::Array(items)) if items.is_empty() => {
                report.push(format!("{}.items", path), DefectKind::Empty)
            }
            Some(Value::Array(items)) => {
                let mut mapped = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{}.items[{}]", path, i);
                    match item {
                        Value::String(name) if !name.trim().is_empty() => {
                            let mut obj = Map::new();
                            obj.insert("name".to_string(), Value::String(name.clone()));
                            mapped.push(Value::Object(obj));
                        }
                        Value::Object(obj) => {
                            let mut obj = obj.clone();
                            apply_aliases(&mut obj, ITEM_ALIASES);
                            match obj.get("name") {
                                Some(Value::String(name)) if !name.trim().is_empty() => {}
                                Some(Value::String(_)) => {
                                    report.push(format!("{}.name", item_path), DefectKind::Empty)
                                }
                                None | Some(Value::Null) => report
                                    .push(format!("{}.name", item_path), DefectKind::Missing),
                                Some(_) => report.push(
                                    format!("{}.name", item_path),
                                    DefectKind::WrongType { expected: "string" },
                                ),
                            }
                            mapped.push(Value::Object(obj));
                        }
                        _ => report.push(item_path, DefectKind::WrongType { expected: "object" }),
                    }
                }
                day.insert("items".to_string(), Value::Array(mapped));
            }
            Some(_) => report.push(
                format!("{}.items", path),
                DefectKind::WrongType { expected: "array" },
            ),
        }
        normalized.push(day);
    }

    if report.is_empty() {
        Ok(normalized)
    } else {
        Err(report)
    }
}

fn normalize_day(index: usize, day: &Map<String, Value>, difficulty: Difficulty) -> DayEntry {
    let label = match day.get("label") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => format!("Day {}", n),
        _ => format!("Day {}", index + 1),
    };
    let focus = match day.get("focus") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Array(parts)) => {
            let parts: Vec<&str> = parts.iter().filter_map(Value::as_str).collect();
            if parts.is_empty() {
                "General".to_string()
            } else {
                parts.join(", ")
            }
        }
        _ => "General".to_string(),
    };
    let items = day
        .get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .map(|item| normalize_item(item, difficulty))
                .collect()
        })
        .unwrap_or_default();

    DayEntry {
        label,
        focus,
        items,
    }
}

fn normalize_item(item: &Map<String, Value>, difficulty: Difficulty) -> ItemEntry {
    let name = item
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let rest_units = coerce_count(item.get("restUnits"))
        .or_else(|| item.get("rest").and_then(coerce_duration_seconds))
        .unwrap_or_else(|| difficulty.default_rest());

    let notes = match item.get("notes") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Array(parts)) => {
            let parts: Vec<&str> = parts.iter().filter_map(Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    };

    ItemEntry {
        name,
        sets: coerce_count(item.get("sets")).unwrap_or_else(|| difficulty.default_sets()),
        repetitions: coerce_count(item.get("repetitions"))
            .unwrap_or_else(|| difficulty.default_repetitions()),
        rest_units,
        notes,
    }
}

/// Rule 5: exactly `day_count` entries, cloning existing days as needed.
fn complete_schedule(schedule: &mut Vec<DayEntry>, day_count: usize) {
    if schedule.len() > day_count {
        schedule.truncate(day_count);
        return;
    }
    let original = schedule.len();
    if original == 0 {
        return;
    }
    for n in original..day_count {
        let mut clone = schedule[n % original].clone();
        clone.label = unused_label(schedule, &format!("Day {}", n + 1));
        schedule.push(clone);
    }
}

/// `base`, or the first `base (Variation)`, `base (Variation 2)`, ... not yet taken.
fn unused_label(schedule: &[DayEntry], base: &str) -> String {
    let taken = |label: &str| schedule.iter().any(|d| d.label == label);
    if !taken(base) {
        return base.to_string();
    }
    let mut label = format!("{} (Variation)", base);
    let mut n = 2;
    while taken(&label) {
        label = format!("{} (Variation {})", base, n);
        n += 1;
    }
    label
}

/// Non-negative integer from a number or numeric string.
///
/// Ranges such as `"8-12"` resolve to their upper bound; text without any
/// digits yields `None`.
pub fn coerce_count(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Some(u.min(u32::MAX as u64) as u32)
            } else if let Some(f) = n.as_f64() {
                (f.is_finite() && f >= 0.0).then(|| f.floor().min(u32::MAX as f64) as u32)
            } else {
                None
            }
        }
        Value::String(s) => parse_number_text(s).map(|f| f.floor().min(u32::MAX as f64) as u32),
        _ => None,
    }
}

/// Seconds from a number or a duration string (`"90s"`, `"1 min"`, `"1:30"`).
pub fn coerce_duration_seconds(value: &Value) -> Option<u32> {
    let text = match value {
        Value::String(s) => s.trim().to_ascii_lowercase(),
        other => return coerce_count(Some(other)),
    };

    if let Some(seconds) = clock_seconds(&text) {
        return Some(seconds);
    }

    let amount = parse_number_text(&text)?;
    let digits_at = text.find(|c: char| c.is_ascii_digit())?;
    let unit: String = text[digits_at..]
        .chars()
        .skip_while(|c| !c.is_alphabetic())
        .take_while(|c| c.is_alphabetic())
        .collect();
    let multiplier = if unit.starts_with('h') {
        3600.0
    } else if unit.starts_with("m") && !unit.starts_with("ms") {
        60.0
    } else {
        1.0
    };
    Some((amount * multiplier).floor().min(u32::MAX as f64) as u32)
}

/// `m:ss` anywhere in the text; a colon after a label (`"rest: 60s"`) is not one.
fn clock_seconds(text: &str) -> Option<u32> {
    text.match_indices(':').find_map(|(at, _)| {
        let before = &text[..at];
        let minutes_from = before
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map(|(i, _)| i)?;
        let after = &text[at + 1..];
        let seconds_len = after.find(|c: char| !c.is_ascii_digit()).unwrap_or(after.len());
        let minutes: u32 = before[minutes_from..].parse().ok()?;
        let seconds: u32 = after[..seconds_len].parse().ok()?;
        Some(minutes.saturating_mul(60).saturating_add(seconds))
    })
}

/// First number in free text, or the upper bound of a leading range.
///
/// A negative first number (`"-2"`) is unparsable.
fn parse_number_text(text: &str) -> Option<f64> {
    let mut tokens: Vec<(usize, usize)> = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in text.char_indices() {
        let numeric = c.is_ascii_digit() || (c == '.' && start.is_some());
        match (numeric, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                tokens.push((s, i));
                start = None;
                if tokens.len() == 2 {
                    break;
                }
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        if tokens.len() < 2 {
            tokens.push((s, text.len()));
        }
    }

    let (first_start, first_end) = *tokens.first()?;
    if text[..first_start].trim_end().ends_with('-') {
        return None;
    }
    let first: f64 = text[first_start..first_end].trim_end_matches('.').parse().ok()?;
    if let Some(&(second_start, second_end)) = tokens.get(1) {
        let between = text[first_end..second_start].trim();
        if matches!(between, "-" | "\u{2013}" | "to") {
            if let Ok(second) = text[second_start..second_end].trim_end_matches('.').parse() {
                return Some(second);
            }
        }
    }
    Some(first)
}

/// Non-empty list of strings; a lone string becomes a one-element list.
fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let list: Vec<String> = match value? {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Object(obj) => obj
                    .get("name")
                    .or_else(|| obj.get("description"))
                    .and_then(Value::as_str)
                    .map(|s| s.trim().to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => return None,
    };
    (!list.is_empty()).then_some(list)
}

fn progression_notes(value: Option<&Value>) -> ProgressionNotes {
    let mut notes: [String; 3] = DEFAULT_PROGRESSION.map(str::to_string);
    match value {
        Some(Value::Object(map)) => {
            let mut map = map.clone();
            apply_aliases(&mut map, PROGRESSION_ALIASES);
            for (slot, key) in notes.iter_mut().zip(["period2", "period3", "period4"]) {
                if let Some(text) = map.get(key).and_then(Value::as_str) {
                    if !text.trim().is_empty() {
                        *slot = text.trim().to_string();
                    }
                }
            }
        }
        Some(Value::Array(items)) => {
            for (slot, text) in notes
                .iter_mut()
                .zip(items.iter().filter_map(Value::as_str))
            {
                if !text.trim().is_empty() {
                    *slot = text.trim().to_string();
                }
            }
        }
        _ => {}
    }
    let [period2, period3, period4] = notes;
    ProgressionNotes {
        period2,
        period3,
        period4,
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
