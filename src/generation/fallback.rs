//! Deterministic Template Fallback
//!
//! API-free last tier. [`build_fallback`] is total: any request, including a
//! zero frequency, yields a plan satisfying the plan invariants, and equal
//! requests yield equal plans.

use crate::generation::plan::{DayEntry, ItemEntry, ProgressionNotes, ValidatedPlan};
use crate::generation::request::{Difficulty, GenerationRequest};
use crate::generation::validate::{DEFAULT_PREP_STEPS, DEFAULT_PROGRESSION, DEFAULT_WIND_DOWN_STEPS};

const ACTIVE_RECOVERY: &str = "Active Recovery";

/// Split labels by requested frequency; frequencies above 7 cycle the last row.
const SPLITS: [&[&str]; 7] = [
    &["Full Body"],
    &["Upper Body", "Lower Body"],
    &["Push", "Pull", "Legs"],
    &["Chest & Triceps", "Back & Biceps", "Legs", "Shoulders & Core"],
    &["Push", "Pull", "Legs", "Upper Body", "Lower Body"],
    &["Push", "Pull", "Legs", "Push", "Pull", "Legs"],
    &["Push", "Pull", "Legs", "Push", "Pull", "Legs", ACTIVE_RECOVERY],
];

/// `(standard, beginner)` exercise names per split label.
fn template_items(label: &str) -> &'static [(&'static str, &'static str)] {
    match label {
        "Full Body" => &[
            ("Barbell Back Squat", "Goblet Squat"),
            ("Bench Press", "Push-Up"),
            ("Bent-Over Row", "Dumbbell Row"),
            ("Romanian Deadlift", "Glute Bridge"),
            ("Overhead Press", "Dumbbell Shoulder Press"),
        ],
        "Upper Body" => &[
            ("Bench Press", "Push-Up"),
            ("Pull-Up", "Lat Pulldown"),
            ("Overhead Press", "Dumbbell Shoulder Press"),
            ("Seated Cable Row", "Band Row"),
            ("Dumbbell Curl", "Dumbbell Curl"),
        ],
        "Lower Body" => &[
            ("Barbell Back Squat", "Goblet Squat"),
            ("Romanian Deadlift", "Glute Bridge"),
            ("Walking Lunge", "Split Squat"),
            ("Leg Curl", "Stability Ball Leg Curl"),
            ("Standing Calf Raise", "Standing Calf Raise"),
        ],
        "Push" => &[
            ("Bench Press", "Push-Up"),
            ("Overhead Press", "Dumbbell Shoulder Press"),
            ("Incline Dumbbell Press", "Incline Push-Up"),
            ("Lateral Raise", "Lateral Raise"),
            ("Triceps Dip", "Bench Dip"),
        ],
        "Pull" => &[
            ("Pull-Up", "Lat Pulldown"),
            ("Bent-Over Row", "Dumbbell Row"),
            ("Face Pull", "Band Pull-Apart"),
            ("Barbell Curl", "Dumbbell Curl"),
        ],
        "Legs" => &[
            ("Barbell Back Squat", "Goblet Squat"),
            ("Romanian Deadlift", "Glute Bridge"),
            ("Bulgarian Split Squat", "Step-Up"),
            ("Standing Calf Raise", "Standing Calf Raise"),
        ],
        "Chest & Triceps" => &[
            ("Bench Press", "Push-Up"),
            ("Incline Dumbbell Press", "Incline Push-Up"),
            ("Cable Fly", "Dumbbell Fly"),
            ("Triceps Dip", "Bench Dip"),
        ],
        "Back & Biceps" => &[
            ("Pull-Up", "Lat Pulldown"),
            ("Bent-Over Row", "Dumbbell Row"),
            ("Face Pull", "Band Pull-Apart"),
            ("Hammer Curl", "Dumbbell Curl"),
        ],
        "Shoulders & Core" => &[
            ("Overhead Press", "Dumbbell Shoulder Press"),
            ("Lateral Raise", "Lateral Raise"),
            ("Hanging Leg Raise", "Dead Bug"),
            ("Plank", "Plank"),
        ],
        _ => &[
            ("Brisk Walk", "Brisk Walk"),
            ("Mobility Flow", "Mobility Flow"),
            ("Foam Rolling", "Foam Rolling"),
        ],
    }
}

/// Finisher appended on training days when the request names a matching focus tag.
fn focus_finisher(tag: &str) -> Option<&'static str> {
    let tag = tag.trim().to_ascii_lowercase();
    match tag.as_str() {
        "core" | "abs" => Some("Plank"),
        "cardio" | "conditioning" | "endurance" => Some("Jump Rope Intervals"),
        "mobility" | "flexibility" => Some("World's Greatest Stretch"),
        "glutes" => Some("Glute Bridge"),
        _ => None,
    }
}

fn split_for(day_count: usize) -> Vec<&'static str> {
    let row = SPLITS[day_count.clamp(1, SPLITS.len()) - 1];
    (0..day_count.max(1)).map(|i| row[i % row.len()]).collect()
}

fn item(name: &str, difficulty: Difficulty, recovery: bool) -> ItemEntry {
    if recovery {
        return ItemEntry {
            name: name.to_string(),
            sets: 1,
            repetitions: 1,
            rest_units: 0,
            notes: Some("10 minutes at an easy, conversational pace".to_string()),
        };
    }
    ItemEntry {
        name: name.to_string(),
        sets: difficulty.default_sets(),
        repetitions: difficulty.default_repetitions(),
        rest_units: difficulty.default_rest(),
        notes: None,
    }
}

fn build_day(index: usize, label: &str, request: &GenerationRequest) -> DayEntry {
    let recovery = label == ACTIVE_RECOVERY;
    let beginner = request.difficulty == Difficulty::Beginner;

    let mut items: Vec<ItemEntry> = template_items(label)
        .iter()
        .map(|(standard, easier)| {
            let name = if beginner { easier } else { standard };
            item(name, request.difficulty, recovery)
        })
        .collect();

    if !recovery {
        for finisher in request.focus.iter().filter_map(|tag| focus_finisher(tag)) {
            if !items.iter().any(|existing| existing.name == finisher) {
                items.push(item(finisher, request.difficulty, false));
            }
        }
    }

    DayEntry {
        label: format!("Day {}", index + 1),
        focus: label.to_string(),
        items,
    }
}

/// Generic but valid plan for `request`. No I/O, no clock, no randomness.
pub fn build_fallback(request: &GenerationRequest) -> ValidatedPlan {
    let schedule = split_for(request.day_count())
        .into_iter()
        .enumerate()
        .map(|(index, label)| build_day(index, label, request))
        .collect();

    let [period2, period3, period4] = DEFAULT_PROGRESSION.map(str::to_string);

    ValidatedPlan {
        schedule,
        prep_steps: DEFAULT_PREP_STEPS.iter().map(|s| s.to_string()).collect(),
        wind_down_steps: DEFAULT_WIND_DOWN_STEPS.iter().map(|s| s.to_string()).collect(),
        progression_notes: ProgressionNotes {
            period2,
            period3,
            period4,
        },
        recommended_focus_areas: request
            .focus
            .iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
    }
}
