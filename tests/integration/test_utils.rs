//! Shared test utilities for integration tests
//!
//! Scripted provider fake, pipeline harness over in-memory state, and
//! serialized access to process environment variables.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use planwright::clock::ManualClock;
use planwright::config::PipelineConfig;
use planwright::error::ProviderError;
use planwright::generation::{CircuitBreaker, PlanOrchestrator, RetryPolicy};
use planwright::provider::{
    ChatMessage, CompletionOptions, CompletionResponse, ModelProviderClient, TokenUsage,
};
use planwright::store::MemoryKeyValueStore;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// One scripted upstream reaction.
pub enum Step {
    /// Plain text content.
    Text(String),
    /// Function-call arguments (content left empty).
    Arguments(String),
    Fail(ProviderError),
    /// Never resolves; the call timeout must fire.
    Hang,
}

pub fn text(content: &str) -> Step {
    Step::Text(content.to_string())
}

/// Fake model provider replaying a fixed script. An exhausted script answers
/// with a non-transient request error.
pub struct ScriptedProvider {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<CompletionOptions>>,
}

impl ScriptedProvider {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Options of every call received, in order.
    pub fn calls(&self) -> Vec<CompletionOptions> {
        self.calls.lock().clone()
    }

    pub fn remaining(&self) -> usize {
        self.steps.lock().len()
    }
}

fn response(content: String, function_arguments: Option<String>) -> CompletionResponse {
    CompletionResponse {
        content,
        function_arguments,
        model: "scripted".to_string(),
        usage: TokenUsage::default(),
        finish_reason: Some("stop".to_string()),
    }
}

#[async_trait]
impl ModelProviderClient for ScriptedProvider {
    async fn complete(
        &self,
        _messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, ProviderError> {
        self.calls.lock().push(options);
        let step = self.steps.lock().pop_front();
        match step {
            Some(Step::Text(content)) => Ok(response(content, None)),
            Some(Step::Arguments(arguments)) => Ok(response(String::new(), Some(arguments))),
            Some(Step::Fail(err)) => Err(err),
            Some(Step::Hang) => {
                std::future::pending::<()>().await;
                Err(ProviderError::Request("unreachable".to_string()))
            }
            None => Err(ProviderError::Request("script exhausted".to_string())),
        }
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Orchestrator over a scripted provider, an in-memory circuit and a manual clock.
pub struct Harness {
    pub orchestrator: PlanOrchestrator,
    pub provider: Arc<ScriptedProvider>,
    pub clock: Arc<ManualClock>,
    pub circuit: Arc<CircuitBreaker>,
}

impl Harness {
    pub fn invocations(&self) -> usize {
        self.orchestrator.client().invocations()
    }
}

/// Default tier order, no retries, short timeout, 15 minute circuit.
pub fn test_pipeline() -> PipelineConfig {
    PipelineConfig {
        call_timeout_ms: 2_000,
        retry: RetryPolicy::none(),
        ..PipelineConfig::default()
    }
}

pub fn harness(steps: Vec<Step>) -> Harness {
    harness_with(steps, test_pipeline())
}

pub fn harness_with(steps: Vec<Step>, pipeline: PipelineConfig) -> Harness {
    let clock = Arc::new(ManualClock::new(
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
    ));
    let store = Arc::new(MemoryKeyValueStore::with_clock(clock.clone()));
    let circuit = Arc::new(CircuitBreaker::new(
        store,
        clock.clone(),
        pipeline.circuit_ttl(),
    ));
    let provider = ScriptedProvider::new(steps);
    let orchestrator = PlanOrchestrator::from_config(
        &pipeline,
        provider.clone(),
        circuit.clone(),
        CompletionOptions::default(),
    );
    Harness {
        orchestrator,
        provider,
        clock,
        circuit,
    }
}

pub fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

const ISOLATED_VARS: [&str; 4] = ["HOME", "XDG_CONFIG_HOME", "XDG_DATA_HOME", "PLANWRIGHT_ENV"];

/// Run `f` with HOME and XDG directories inside `test_dir`, plus extra
/// variables, restoring the previous environment afterwards.
pub fn with_isolated_env<F, R>(test_dir: &TempDir, extra: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    let names: Vec<String> = ISOLATED_VARS
        .iter()
        .map(|v| v.to_string())
        .chain(extra.iter().map(|(k, _)| k.to_string()))
        .collect();
    let saved: Vec<(String, Option<String>)> = names
        .iter()
        .map(|name| (name.clone(), std::env::var(name).ok()))
        .collect();

    let home = test_dir.path().join("home");
    let config_home = test_dir.path().join("config");
    let data_home = test_dir.path().join("data");
    for dir in [&home, &config_home, &data_home] {
        std::fs::create_dir_all(dir).unwrap();
    }
    std::env::set_var("HOME", &home);
    std::env::set_var("XDG_CONFIG_HOME", &config_home);
    std::env::set_var("XDG_DATA_HOME", &data_home);
    std::env::remove_var("PLANWRIGHT_ENV");
    for (key, value) in extra {
        std::env::set_var(key, value);
    }

    let result = f();

    for (name, value) in saved {
        match value {
            Some(value) => std::env::set_var(&name, value),
            None => std::env::remove_var(&name),
        }
    }
    result
}
