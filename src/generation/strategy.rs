//! Generation strategies (tiers).
//!
//! Each strategy turns a request into a [`CandidateDocument`] through one or
//! more generation client calls followed by text repair. Validation is left to
//! the orchestrator so every tier is judged by the same rules.

use crate::error::{GenerationError, ParseError};
use crate::generation::client::{GenerationClient, ModelCall};
use crate::generation::prompt;
use crate::generation::repair::{CandidateDocument, TextRepair};
use crate::generation::request::GenerationRequest;
use crate::generation::retry::RetryPolicy;
use crate::provider::CompletionOptions;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    FunctionCall,
    StructuredPrompt,
    DecomposedPerUnit,
    SimplifiedFormat,
}

impl StrategyKind {
    /// Default tier order: most capable first, safest last.
    pub const DEFAULT_ORDER: [StrategyKind; 4] = [
        StrategyKind::FunctionCall,
        StrategyKind::StructuredPrompt,
        StrategyKind::DecomposedPerUnit,
        StrategyKind::SimplifiedFormat,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::FunctionCall => "function_call",
            StrategyKind::StructuredPrompt => "structured_prompt",
            StrategyKind::DecomposedPerUnit => "decomposed_per_unit",
            StrategyKind::SimplifiedFormat => "simplified_format",
        }
    }

    pub fn build(self, retry: RetryPolicy) -> Box<dyn PlanStrategy> {
        match self {
            StrategyKind::FunctionCall => Box::new(FunctionCallStrategy::new(retry)),
            StrategyKind::StructuredPrompt => Box::new(StructuredPromptStrategy::new(retry)),
            StrategyKind::DecomposedPerUnit => Box::new(DecomposedPerUnitStrategy::new(retry)),
            StrategyKind::SimplifiedFormat => Box::new(SimplifiedFormatStrategy::new(retry)),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::DEFAULT_ORDER
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown strategy: {}", s))
    }
}

#[async_trait]
pub trait PlanStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Whether this tier spends upstream quota; such tiers are skipped while
    /// the circuit is tripped.
    fn calls_upstream(&self) -> bool {
        true
    }

    async fn draft(
        &self,
        request: &GenerationRequest,
        client: &GenerationClient,
        repair: &dyn TextRepair,
    ) -> Result<CandidateDocument, GenerationError>;
}

async fn request_document(
    client: &GenerationClient,
    repair: &dyn TextRepair,
    call: &ModelCall,
    retry: &RetryPolicy,
) -> Result<CandidateDocument, GenerationError> {
    let output = client.request(call, retry).await?;
    debug!(shape = ?output.shape, bytes = output.text.len(), "Repairing model output");
    Ok(repair.repair(&output.text)?)
}

/// Full plan through a forced function call.
pub struct FunctionCallStrategy {
    retry: RetryPolicy,
}

impl FunctionCallStrategy {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }
}

#[async_trait]
impl PlanStrategy for FunctionCallStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FunctionCall
    }

    async fn draft(
        &self,
        request: &GenerationRequest,
        client: &GenerationClient,
        repair: &dyn TextRepair,
    ) -> Result<CandidateDocument, GenerationError> {
        let call = ModelCall::FunctionCall {
            system: prompt::SYSTEM_PROMPT.to_string(),
            user: prompt::function_call_prompt(request),
            function: prompt::plan_function(request),
            options: client.default_options().clone(),
        };
        request_document(client, repair, &call, &self.retry).await
    }
}

/// Full plan as free-text JSON.
pub struct StructuredPromptStrategy {
    retry: RetryPolicy,
}

impl StructuredPromptStrategy {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }
}

#[async_trait]
impl PlanStrategy for StructuredPromptStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StructuredPrompt
    }

    async fn draft(
        &self,
        request: &GenerationRequest,
        client: &GenerationClient,
        repair: &dyn TextRepair,
    ) -> Result<CandidateDocument, GenerationError> {
        let call = ModelCall::Prompt {
            system: prompt::SYSTEM_PROMPT.to_string(),
            user: prompt::structured_prompt(request),
            options: client.default_options().clone(),
        };
        request_document(client, repair, &call, &self.retry).await
    }
}

/// One small request per day, assembled into a schedule.
///
/// Days are requested sequentially; the first failing day fails the tier.
pub struct DecomposedPerUnitStrategy {
    retry: RetryPolicy,
}

impl DecomposedPerUnitStrategy {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }
}

#[async_trait]
impl PlanStrategy for DecomposedPerUnitStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DecomposedPerUnit
    }

    async fn draft(
        &self,
        request: &GenerationRequest,
        client: &GenerationClient,
        repair: &dyn TextRepair,
    ) -> Result<CandidateDocument, GenerationError> {
        let day_count = request.day_count();
        let mut days = Vec::with_capacity(day_count);
        let mut covered: Vec<String> = Vec::new();

        for day_number in 1..=day_count {
            let call = ModelCall::Prompt {
                system: prompt::SYSTEM_PROMPT.to_string(),
                user: prompt::day_prompt(request, day_number, &covered),
                options: client.default_options().clone(),
            };
            let document = request_document(client, repair, &call, &self.retry).await?;
            let day = extract_day(document).ok_or_else(|| {
                ParseError::new(format!("day {}: expected a day object", day_number))
            })?;
            if let Some(focus) = day
                .get("focus")
                .or_else(|| day.get("focusArea"))
                .and_then(Value::as_str)
            {
                covered.push(focus.to_string());
            }
            days.push(Value::Object(day));
        }

        let mut plan = Map::new();
        plan.insert("schedule".to_string(), Value::Array(days));
        Ok(Value::Object(plan))
    }
}

/// Unwrap `{"day": {...}}`, `{"schedule": [{...}]}` and `[{...}]` wrappers.
fn extract_day(document: CandidateDocument) -> Option<Map<String, Value>> {
    match document {
        Value::Array(items) => items.into_iter().next().and_then(extract_day),
        Value::Object(mut map) => {
            if let Some(Value::Object(inner)) = map.get("day") {
                return Some(inner.clone());
            }
            if let Some(Value::Array(days)) = map.remove("schedule") {
                return days.into_iter().next().and_then(extract_day);
            }
            Some(map)
        }
        _ => None,
    }
}

/// Minimal shape at low temperature; the validator fills in the rest.
pub struct SimplifiedFormatStrategy {
    retry: RetryPolicy,
}

const SIMPLIFIED_TEMPERATURE: f32 = 0.2;

impl SimplifiedFormatStrategy {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }
}

#[async_trait]
impl PlanStrategy for SimplifiedFormatStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SimplifiedFormat
    }

    async fn draft(
        &self,
        request: &GenerationRequest,
        client: &GenerationClient,
        repair: &dyn TextRepair,
    ) -> Result<CandidateDocument, GenerationError> {
        let call = ModelCall::Prompt {
            system: prompt::SYSTEM_PROMPT.to_string(),
            user: prompt::simplified_prompt(request),
            options: CompletionOptions {
                temperature: Some(SIMPLIFIED_TEMPERATURE),
                ..client.default_options().clone()
            },
        };
        request_document(client, repair, &call, &self.retry).await
    }
}
