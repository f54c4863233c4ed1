//! Integration tests for the rate-limit circuit across generate calls

use crate::integration::test_utils::{harness, secs, text, Step};
use chrono::{TimeZone, Utc};
use planwright::clock::{Clock, ManualClock};
use planwright::error::ProviderError;
use planwright::generation::circuit::{TRIPPED_AT_KEY, TRIP_FLAG_KEY};
use planwright::generation::{
    CircuitBreaker, Difficulty, FallbackReason, FallbackResult, GenerationRequest, PlanOutcome,
    StrategyKind,
};
use planwright::store::{KeyValueStore, SledKeyValueStore};
use std::sync::Arc;
use tempfile::TempDir;

const VALID: &str = r#"{"schedule": [{"label": "Day 1", "focus": "Core", "items": [{"name": "Plank"}]}]}"#;

fn rate_limited() -> Step {
    Step::Fail(ProviderError::RateLimited("429 Too Many Requests".to_string()))
}

fn is_circuit_fallback(outcome: &PlanOutcome) -> bool {
    matches!(
        outcome,
        PlanOutcome::Fallback(FallbackResult {
            reason: FallbackReason::CircuitOpen,
            ..
        })
    )
}

#[tokio::test]
async fn test_rate_limit_skips_remaining_tiers() {
    let h = harness(vec![rate_limited(), text(VALID)]);
    let request = GenerationRequest::new(1, Difficulty::Beginner);

    let outcome = h.orchestrator.generate(&request).await;

    assert!(is_circuit_fallback(&outcome));
    assert_eq!(h.invocations(), 1);
    assert_eq!(h.provider.remaining(), 1);
    assert!(h.circuit.is_tripped());
}

#[tokio::test]
async fn test_tripped_circuit_means_zero_invocations_until_ttl_elapses() {
    let h = harness(vec![rate_limited(), Step::Arguments(VALID.to_string())]);
    let request = GenerationRequest::new(1, Difficulty::Beginner);

    h.orchestrator.generate(&request).await;
    assert_eq!(h.invocations(), 1);

    // Inside the 15 minute window: no upstream traffic at all.
    for minutes in [1, 5, 14] {
        let start = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        h.clock.set(start + chrono::Duration::minutes(minutes));
        let outcome = h.orchestrator.generate(&request).await;
        assert!(is_circuit_fallback(&outcome));
        assert!(outcome.plan().satisfies_invariants());
        assert_eq!(h.invocations(), 1);
    }

    // Past the window the tiers run again.
    h.clock.advance(secs(120));
    let outcome = h.orchestrator.generate(&request).await;
    assert_eq!(outcome.strategy(), Some(StrategyKind::FunctionCall));
    assert_eq!(h.invocations(), 2);
    assert!(!h.circuit.is_tripped());
}

#[tokio::test]
async fn test_clearing_circuit_restores_upstream_calls() {
    let h = harness(vec![rate_limited(), Step::Arguments(VALID.to_string())]);
    let request = GenerationRequest::new(1, Difficulty::Beginner);

    h.orchestrator.generate(&request).await;
    h.circuit.clear().unwrap();

    let outcome = h.orchestrator.generate(&request).await;
    assert!(!outcome.is_fallback());
    assert_eq!(h.invocations(), 2);
}

#[tokio::test]
async fn test_rate_limit_in_later_tier_also_trips() {
    let h = harness(vec![
        text("no json here"),
        rate_limited(),
        text(VALID),
    ]);

    let outcome = h
        .orchestrator
        .generate(&GenerationRequest::new(1, Difficulty::Beginner))
        .await;

    assert!(is_circuit_fallback(&outcome));
    assert_eq!(h.invocations(), 2);
}

#[test]
fn test_trip_state_survives_store_reopen() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
    ));

    // A trip persisted by an earlier process.
    {
        let store = SledKeyValueStore::with_clock(dir.path(), clock.clone()).unwrap();
        let tripped_at = bincode::serialize(&clock.now().timestamp_millis()).unwrap();
        let ttl_ms = bincode::serialize(&900_000u64).unwrap();
        store.set(TRIPPED_AT_KEY, &tripped_at, Some(secs(900))).unwrap();
        store.set(TRIP_FLAG_KEY, &ttl_ms, Some(secs(900))).unwrap();
        store.flush().unwrap();
    }

    let store = SledKeyValueStore::with_clock(dir.path(), clock.clone()).unwrap();
    let circuit = CircuitBreaker::new(Arc::new(store), clock.clone(), secs(900));
    let state = circuit.state().unwrap().expect("trip should persist");
    assert_eq!(state.ttl, secs(900));
    assert_eq!(state.remaining(clock.now()), secs(900));

    clock.advance(secs(901));
    assert!(!circuit.is_tripped());
    assert!(circuit.state().unwrap().is_none());
}
