//! Property-based tests for pipeline totality: whatever the upstream does,
//! generation yields a plan satisfying the plan invariants.

use async_trait::async_trait;
use parking_lot::Mutex;
use planwright::clock::ManualClock;
use planwright::config::PipelineConfig;
use planwright::error::ProviderError;
use planwright::generation::{
    CircuitBreaker, Difficulty, GenerationRequest, PlanOrchestrator, RetryPolicy,
};
use planwright::provider::{
    ChatMessage, CompletionOptions, CompletionResponse, ModelProviderClient, TokenUsage,
};
use planwright::store::MemoryKeyValueStore;
use proptest::prelude::*;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Reply {
    Prose(String),
    Malformed,
    WrongShape,
    Error(u8),
}

fn reply() -> impl Strategy<Value = Reply> {
    prop_oneof![
        "[A-Za-z ]{0,30}".prop_map(Reply::Prose),
        Just(Reply::Malformed),
        Just(Reply::WrongShape),
        (0u8..5).prop_map(Reply::Error),
    ]
}

struct Replaying {
    replies: Mutex<VecDeque<Reply>>,
}

#[async_trait]
impl ModelProviderClient for Replaying {
    async fn complete(
        &self,
        _messages: Vec<ChatMessage>,
        _options: CompletionOptions,
    ) -> Result<CompletionResponse, ProviderError> {
        let next = self.replies.lock().pop_front();
        let content = match next {
            Some(Reply::Prose(text)) => text,
            Some(Reply::Malformed) => "{\"schedule\": [{\"label\": ".to_string(),
            Some(Reply::WrongShape) => "{\"schedule\": [{\"label\": \"Day 1\"}]}".to_string(),
            Some(Reply::Error(code)) => {
                return Err(match code {
                    0 => ProviderError::RateLimited("429".to_string()),
                    1 => ProviderError::Server {
                        status: 503,
                        message: "unavailable".to_string(),
                    },
                    2 => ProviderError::Connection("refused".to_string()),
                    3 => ProviderError::Auth("bad key".to_string()),
                    _ => ProviderError::InvalidResponse("no choices".to_string()),
                })
            }
            None => String::new(),
        };
        Ok(CompletionResponse {
            content,
            function_arguments: None,
            model: "replaying".to_string(),
            usage: TokenUsage::default(),
            finish_reason: None,
        })
    }

    fn provider_name(&self) -> &str {
        "replaying"
    }

    fn model_name(&self) -> &str {
        "replaying"
    }
}

#[test]
fn test_generation_always_yields_valid_plan() {
    let mut runner = proptest::test_runner::TestRunner::new(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    });
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();

    runner
        .run(
            &(proptest::collection::vec(reply(), 0..12), 0u32..=20),
            |(replies, frequency)| {
                let pipeline = PipelineConfig {
                    call_timeout_ms: 1_000,
                    retry: RetryPolicy::none(),
                    ..PipelineConfig::default()
                };
                let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
                let circuit = Arc::new(CircuitBreaker::new(
                    Arc::new(MemoryKeyValueStore::with_clock(clock.clone())),
                    clock,
                    pipeline.circuit_ttl(),
                ));
                let provider = Arc::new(Replaying {
                    replies: Mutex::new(replies.into()),
                });
                let orchestrator = PlanOrchestrator::from_config(
                    &pipeline,
                    provider,
                    circuit,
                    CompletionOptions::default(),
                );
                let request = GenerationRequest::new(frequency, Difficulty::Intermediate);

                let outcome = runtime.block_on(orchestrator.generate(&request));

                assert!(outcome.plan().satisfies_invariants());
                assert_eq!(outcome.plan().schedule.len(), request.day_count());
                assert!(outcome.is_fallback());

                Ok(())
            },
        )
        .unwrap();
}
