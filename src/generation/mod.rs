//! Resilient plan generation pipeline.
//!
//! request -> circuit check -> strategies in order (client call, repair,
//! validation) -> first success, or the deterministic template.

pub mod circuit;
pub mod client;
pub mod fallback;
pub mod orchestrator;
pub mod plan;
pub mod prompt;
pub mod repair;
pub mod request;
pub mod retry;
pub mod strategy;
pub mod validate;

pub use circuit::{CircuitBreaker, CircuitState};
pub use client::{GenerationClient, ModelCall, OutputShape, RawModelOutput};
pub use fallback::build_fallback;
pub use orchestrator::PlanOrchestrator;
pub use plan::{
    DayEntry, FallbackReason, FallbackResult, GeneratedPlan, ItemEntry, PlanOutcome,
    ProgressionNotes, ValidatedPlan,
};
pub use repair::{repair, CandidateDocument, JsonRepairEngine, TextRepair};
pub use request::{Difficulty, GenerationRequest, MAX_DAYS};
pub use retry::RetryPolicy;
pub use strategy::{
    DecomposedPerUnitStrategy, FunctionCallStrategy, PlanStrategy, SimplifiedFormatStrategy,
    StrategyKind, StructuredPromptStrategy,
};
pub use validate::{validate_plan, Defect, DefectKind, PlanSchema, ValidationReport};
