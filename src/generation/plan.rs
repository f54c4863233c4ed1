//! Canonical plan types handed back to callers.
//!
//! Nothing downstream of the validator sees an untyped document; these
//! structs are the only shape consumers receive.

use crate::generation::strategy::StrategyKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One concrete step within a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEntry {
    pub name: String,
    pub sets: u32,
    pub repetitions: u32,
    /// Rest after each set, in seconds.
    pub rest_units: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One scheduled day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayEntry {
    pub label: String,
    pub focus: String,
    pub items: Vec<ItemEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionNotes {
    pub period2: String,
    pub period3: String,
    pub period4: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedPlan {
    pub schedule: Vec<DayEntry>,
    pub prep_steps: Vec<String>,
    pub wind_down_steps: Vec<String>,
    pub progression_notes: ProgressionNotes,
    #[serde(default)]
    pub recommended_focus_areas: Vec<String>,
}

impl ValidatedPlan {
    /// Total item-entries across all days.
    pub fn item_count(&self) -> usize {
        self.schedule.iter().map(|day| day.items.len()).sum()
    }

    /// Every day has items and no day list is empty.
    pub fn satisfies_invariants(&self) -> bool {
        !self.schedule.is_empty() && self.schedule.iter().all(|day| !day.items.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// The rate-limit circuit was open; no upstream call was made.
    CircuitOpen,
    /// Every configured strategy failed.
    StrategiesExhausted,
    /// No upstream strategy is configured.
    NoStrategies,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FallbackReason::CircuitOpen => "circuit_open",
            FallbackReason::StrategiesExhausted => "strategies_exhausted",
            FallbackReason::NoStrategies => "no_strategies",
        };
        f.write_str(label)
    }
}

/// Template plan returned when no strategy produced a usable document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackResult {
    #[serde(flatten)]
    pub plan: ValidatedPlan,
    pub is_fallback: bool,
    pub message: String,
    pub reason: FallbackReason,
}

impl FallbackResult {
    pub fn new(plan: ValidatedPlan, reason: FallbackReason) -> Self {
        Self {
            plan,
            is_fallback: true,
            message: fallback_message(reason).to_string(),
            reason,
        }
    }
}

fn fallback_message(reason: FallbackReason) -> &'static str {
    match reason {
        FallbackReason::CircuitOpen => {
            "Personalized generation is paused after hitting a usage limit. \
             Here is a balanced starter plan; try again later for a tailored version."
        }
        FallbackReason::StrategiesExhausted => {
            "We couldn't personalize your plan right now, so here is a balanced starter plan. \
             Try again later for a tailored version."
        }
        FallbackReason::NoStrategies => {
            "Personalized generation is not configured. Here is a balanced starter plan."
        }
    }
}

/// Result of one `generate` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PlanOutcome {
    Generated(GeneratedPlan),
    Fallback(FallbackResult),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPlan {
    #[serde(flatten)]
    pub plan: ValidatedPlan,
    pub is_fallback: bool,
    pub strategy: StrategyKind,
}

impl PlanOutcome {
    pub fn generated(plan: ValidatedPlan, strategy: StrategyKind) -> Self {
        PlanOutcome::Generated(GeneratedPlan {
            plan,
            is_fallback: false,
            strategy,
        })
    }

    pub fn plan(&self) -> &ValidatedPlan {
        match self {
            PlanOutcome::Generated(generated) => &generated.plan,
            PlanOutcome::Fallback(fallback) => &fallback.plan,
        }
    }

    pub fn into_plan(self) -> ValidatedPlan {
        match self {
            PlanOutcome::Generated(generated) => generated.plan,
            PlanOutcome::Fallback(fallback) => fallback.plan,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, PlanOutcome::Fallback(_))
    }

    /// Winning strategy, `None` for template output.
    pub fn strategy(&self) -> Option<StrategyKind> {
        match self {
            PlanOutcome::Generated(generated) => Some(generated.strategy),
            PlanOutcome::Fallback(_) => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            PlanOutcome::Generated(_) => None,
            PlanOutcome::Fallback(fallback) => Some(&fallback.message),
        }
    }
}
