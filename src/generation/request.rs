//! Caller preferences for one generation run.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Upper bound on day-entries in one plan.
pub const MAX_DAYS: u32 = 14;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Lenient parse: unknown labels map to `Beginner`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "intermediate" | "medium" | "moderate" => Difficulty::Intermediate,
            "advanced" | "expert" | "hard" => Difficulty::Advanced,
            _ => Difficulty::Beginner,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    pub fn default_repetitions(self) -> u32 {
        match self {
            Difficulty::Beginner => 10,
            Difficulty::Intermediate => 12,
            Difficulty::Advanced => 15,
        }
    }

    pub fn default_sets(self) -> u32 {
        match self {
            Difficulty::Beginner => 3,
            Difficulty::Intermediate => 3,
            Difficulty::Advanced => 4,
        }
    }

    /// Rest between sets, in seconds.
    pub fn default_rest(self) -> u32 {
        match self {
            Difficulty::Beginner => 90,
            Difficulty::Intermediate => 60,
            Difficulty::Advanced => 45,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Difficulty::parse_lenient(&raw))
    }
}

/// Preference bag for one pipeline invocation. Never mutated by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Requested day-entries per week.
    #[serde(default = "default_frequency")]
    pub frequency: u32,
    /// Target session length in minutes.
    #[serde(default = "default_session_minutes")]
    pub session_minutes: u32,
    #[serde(default)]
    pub focus: Vec<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
}

fn default_frequency() -> u32 {
    3
}

fn default_session_minutes() -> u32 {
    45
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            frequency: default_frequency(),
            session_minutes: default_session_minutes(),
            focus: Vec::new(),
            difficulty: Difficulty::default(),
            equipment: Vec::new(),
            constraints: Vec::new(),
        }
    }
}

impl GenerationRequest {
    pub fn new(frequency: u32, difficulty: Difficulty) -> Self {
        Self {
            frequency,
            difficulty,
            ..Self::default()
        }
    }

    pub fn with_focus<I, S>(mut self, focus: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.focus = focus.into_iter().map(Into::into).collect();
        self
    }

    /// Number of day-entries every plan for this request must contain.
    ///
    /// Zero still yields one day; anything above [`MAX_DAYS`] is capped.
    pub fn day_count(&self) -> usize {
        self.frequency.clamp(1, MAX_DAYS) as usize
    }
}
