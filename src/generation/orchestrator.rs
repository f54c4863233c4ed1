//! Tiered Orchestrator
//!
//! Walks the configured strategies in order, sequentially, and returns the
//! first candidate that survives validation. Every [`GenerationError`] is
//! absorbed here; the caller always receives a plan.
//!
//! The circuit is consulted before each upstream tier, so a rate-limit
//! signal raised by one tier also skips the tiers after it.

use crate::config::PipelineConfig;
use crate::error::GenerationError;
use crate::generation::circuit::CircuitBreaker;
use crate::generation::client::GenerationClient;
use crate::generation::fallback::build_fallback;
use crate::generation::plan::{FallbackReason, FallbackResult, PlanOutcome, ValidatedPlan};
use crate::generation::repair::{JsonRepairEngine, TextRepair};
use crate::generation::request::GenerationRequest;
use crate::generation::strategy::{PlanStrategy, StrategyKind};
use crate::generation::validate::{validate_plan, PlanSchema};
use crate::provider::{CompletionOptions, ModelProviderClient};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct PlanOrchestrator {
    client: GenerationClient,
    repair: Arc<dyn TextRepair>,
    strategies: Vec<Box<dyn PlanStrategy>>,
}

impl PlanOrchestrator {
    pub fn new(client: GenerationClient, strategies: Vec<Box<dyn PlanStrategy>>) -> Self {
        Self {
            client,
            repair: Arc::new(JsonRepairEngine),
            strategies,
        }
    }

    /// Client and strategy list as described by `[pipeline]`.
    pub fn from_config(
        pipeline: &PipelineConfig,
        provider: Arc<dyn ModelProviderClient>,
        circuit: Arc<CircuitBreaker>,
        default_options: CompletionOptions,
    ) -> Self {
        let client = GenerationClient::new(provider, circuit, pipeline.call_timeout())
            .with_default_options(default_options);
        Self::new(client, pipeline.build_strategies())
    }

    pub fn with_repair(mut self, repair: Arc<dyn TextRepair>) -> Self {
        self.repair = repair;
        self
    }

    pub fn client(&self) -> &GenerationClient {
        &self.client
    }

    pub fn circuit(&self) -> &CircuitBreaker {
        self.client.circuit()
    }

    pub fn strategy_kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// Produce a plan for `request`. Never fails.
    pub async fn generate(&self, request: &GenerationRequest) -> PlanOutcome {
        let started = Instant::now();
        let schema = PlanSchema::for_request(request);

        if self.strategies.is_empty() {
            return self.fallback(request, FallbackReason::NoStrategies);
        }

        for strategy in &self.strategies {
            let kind = strategy.kind();
            if strategy.calls_upstream() && self.circuit().is_tripped() {
                info!(strategy = %kind, "Circuit open, skipping upstream strategies");
                return self.fallback(request, FallbackReason::CircuitOpen);
            }

            match self.attempt(strategy.as_ref(), request, &schema).await {
                Ok(plan) => {
                    info!(
                        strategy = %kind,
                        days = plan.schedule.len(),
                        items = plan.item_count(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Plan generated"
                    );
                    return PlanOutcome::generated(plan, kind);
                }
                Err(err) => {
                    warn!(
                        strategy = %kind,
                        error_kind = err.kind(),
                        error = %err,
                        "Strategy failed, advancing"
                    );
                }
            }
        }

        self.fallback(request, FallbackReason::StrategiesExhausted)
    }

    async fn attempt(
        &self,
        strategy: &dyn PlanStrategy,
        request: &GenerationRequest,
        schema: &PlanSchema,
    ) -> Result<ValidatedPlan, GenerationError> {
        debug!(strategy = %strategy.kind(), "Attempting strategy");
        let document = strategy
            .draft(request, &self.client, self.repair.as_ref())
            .await?;
        validate_plan(&document, schema).map_err(|report| {
            debug!(defects = %report, "Candidate rejected");
            GenerationError::Validation(report)
        })
    }

    fn fallback(&self, request: &GenerationRequest, reason: FallbackReason) -> PlanOutcome {
        warn!(reason = %reason, "Returning template plan");
        PlanOutcome::Fallback(FallbackResult::new(build_fallback(request), reason))
    }
}
