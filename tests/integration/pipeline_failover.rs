//! Integration tests for tier fail-over through the real strategies

use crate::integration::test_utils::{harness, harness_with, test_pipeline, text, Step};
use planwright::error::ProviderError;
use planwright::generation::{
    build_fallback, Difficulty, FallbackReason, GenerationRequest, PlanOutcome, RetryPolicy,
    StrategyKind,
};
use std::time::Duration;

const PROSE: &str = "Sure! Here's a great plan for you. Stay hydrated and have fun.";

fn two_day_plan() -> String {
    r#"{
        "schedule": [
            {"label": "Day 1", "focus": "Upper", "items": [{"name": "Push-Up", "repetitions": 12, "restUnits": 60}]},
            {"label": "Day 2", "focus": "Lower", "items": [{"name": "Squat", "repetitions": 10, "restUnits": 90}]}
        ],
        "prepSteps": ["March in place"],
        "windDownSteps": ["Hamstring stretch"],
        "progressionNotes": {"period2": "more", "period3": "even more", "period4": "deload"}
    }"#
    .to_string()
}

#[tokio::test]
async fn test_function_call_tier_wins_when_arguments_are_valid() {
    let h = harness(vec![Step::Arguments(two_day_plan())]);
    let request = GenerationRequest::new(2, Difficulty::Intermediate);

    let outcome = h.orchestrator.generate(&request).await;

    assert_eq!(outcome.strategy(), Some(StrategyKind::FunctionCall));
    assert_eq!(outcome.plan().schedule.len(), 2);
    assert_eq!(outcome.plan().prep_steps, vec!["March in place"]);
    assert_eq!(h.invocations(), 1);
    let calls = h.provider.calls();
    assert!(calls[0].function.is_some());
}

#[tokio::test]
async fn test_prose_advances_to_structured_prompt() {
    let fenced = format!("Here you go:\n```json\n{}\n```\nEnjoy!", two_day_plan());
    let h = harness(vec![text(PROSE), text(&fenced)]);

    let outcome = h
        .orchestrator
        .generate(&GenerationRequest::new(2, Difficulty::Beginner))
        .await;

    assert_eq!(outcome.strategy(), Some(StrategyKind::StructuredPrompt));
    assert!(!outcome.is_fallback());
    assert_eq!(h.invocations(), 2);
    assert!(h.provider.calls()[1].function.is_none());
}

#[tokio::test]
async fn test_decomposed_tier_assembles_one_call_per_day() {
    let h = harness(vec![
        text(PROSE),
        text("{\"schedule\": \"later\"}"),
        text(r#"{"day": {"label": "Day 1", "focus": "Push", "exercises": ["Push-Up"]}}"#),
        text(r#"[{"label": "Day 2", "focus": "Pull", "exercises": [{"exercise": "Row", "reps": "8-12"}]}]"#),
        text(r#"Day 3: {"focus": "Legs", "items": [{"name": "Lunge", "rest": "90s"}]}"#),
    ]);

    let outcome = h
        .orchestrator
        .generate(&GenerationRequest::new(3, Difficulty::Beginner))
        .await;

    assert_eq!(outcome.strategy(), Some(StrategyKind::DecomposedPerUnit));
    let plan = outcome.plan();
    let focus: Vec<&str> = plan.schedule.iter().map(|d| d.focus.as_str()).collect();
    assert_eq!(focus, vec!["Push", "Pull", "Legs"]);
    assert_eq!(plan.schedule[1].items[0].repetitions, 12);
    assert_eq!(plan.schedule[2].label, "Day 3");
    assert_eq!(plan.schedule[2].items[0].rest_units, 90);
    assert_eq!(h.invocations(), 5);
}

#[tokio::test]
async fn test_simplified_tier_is_completed_by_validator() {
    let h = harness(vec![
        text(PROSE),
        text(PROSE),
        text(PROSE),
        text(r#"[{"focus": "Full Body", "items": [{"name": "Burpee", "reps": 10}]}]"#),
    ]);

    let outcome = h
        .orchestrator
        .generate(&GenerationRequest::new(1, Difficulty::Advanced))
        .await;

    assert_eq!(outcome.strategy(), Some(StrategyKind::SimplifiedFormat));
    let item = &outcome.plan().schedule[0].items[0];
    assert_eq!(item.sets, Difficulty::Advanced.default_sets());
    assert_eq!(item.rest_units, Difficulty::Advanced.default_rest());
    assert!(!outcome.plan().wind_down_steps.is_empty());
    assert_eq!(h.provider.calls()[3].temperature, Some(0.2));
}

#[tokio::test]
async fn test_every_tier_failing_returns_template() {
    let h = harness(vec![text(PROSE), text(PROSE), text(PROSE), text(PROSE)]);
    let request = GenerationRequest::new(4, Difficulty::Beginner).with_focus(["core"]);

    let outcome = h.orchestrator.generate(&request).await;

    match &outcome {
        PlanOutcome::Fallback(result) => {
            assert!(result.is_fallback);
            assert_eq!(result.reason, FallbackReason::StrategiesExhausted);
            assert!(!result.message.is_empty());
            assert_eq!(result.plan, build_fallback(&request));
        }
        other => panic!("expected template plan, got {:?}", other),
    }
    // Decomposed tier stops at its first failing day.
    assert_eq!(h.invocations(), 4);
    assert!(!h.circuit.is_tripped());
}

#[tokio::test]
async fn test_three_day_request_completes_single_day_response() {
    let h = harness(vec![Step::Arguments(
        r#"{"schedule": [{"label": "Day 1", "focus": "Core", "items": [{"name": "Plank", "repetitions": 3}]}], "prepSteps": ["Cat-cow"]}"#
            .to_string(),
    )]);
    let request = GenerationRequest::new(3, Difficulty::Beginner).with_focus(["core"]);

    let outcome = h.orchestrator.generate(&request).await;

    let plan = outcome.plan();
    assert!(!outcome.is_fallback());
    assert_eq!(plan.schedule.len(), 3);
    let labels: Vec<&str> = plan.schedule.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["Day 1", "Day 2", "Day 3"]);
    assert_eq!(plan.schedule[2].items, plan.schedule[0].items);
    assert!(plan.satisfies_invariants());
}

#[tokio::test]
async fn test_aliases_are_normalized_end_to_end() {
    let h = harness(vec![Step::Arguments(
        r#"{"days": [{"day": "Monday", "focusArea": "Glutes", "exercises": [{"exercise": "Hip Thrust", "reps": "12", "restSeconds": 75, "tips": "Squeeze at the top"}]}],
            "recommendations": ["a", "b"], "warmUp": ["Bike"], "coolDown": ["Walk"],
            "progression": {"week2": "add a set", "week3": "add weight", "week4": "deload"}}"#
            .to_string(),
    )]);

    let outcome = h
        .orchestrator
        .generate(&GenerationRequest::new(1, Difficulty::Beginner))
        .await;

    let plan = outcome.plan();
    assert_eq!(plan.recommended_focus_areas, vec!["a", "b"]);
    assert_eq!(plan.prep_steps, vec!["Bike"]);
    assert_eq!(plan.wind_down_steps, vec!["Walk"]);
    assert_eq!(plan.progression_notes.period2, "add a set");
    let day = &plan.schedule[0];
    assert_eq!(day.label, "Monday");
    assert_eq!(day.focus, "Glutes");
    assert_eq!(day.items[0].name, "Hip Thrust");
    assert_eq!(day.items[0].repetitions, 12);
    assert_eq!(day.items[0].rest_units, 75);
    assert_eq!(day.items[0].notes.as_deref(), Some("Squeeze at the top"));
}

#[tokio::test(start_paused = true)]
async fn test_failing_tier_is_retried_at_most_its_policy() {
    let busy = || {
        Step::Fail(ProviderError::Server {
            status: 503,
            message: "overloaded".to_string(),
        })
    };
    let mut pipeline = test_pipeline();
    pipeline.strategies = vec![StrategyKind::FunctionCall, StrategyKind::StructuredPrompt];
    pipeline.strategy_retry.insert(
        StrategyKind::FunctionCall,
        RetryPolicy::new(3, Duration::from_millis(500)),
    );
    let h = harness_with(vec![busy(), busy(), busy(), text(&two_day_plan())], pipeline);

    let outcome = h
        .orchestrator
        .generate(&GenerationRequest::new(2, Difficulty::Beginner))
        .await;

    assert_eq!(outcome.strategy(), Some(StrategyKind::StructuredPrompt));
    assert_eq!(h.invocations(), 4);
    assert_eq!(h.provider.remaining(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_hanging_upstream_times_out_and_falls_back() {
    let h = harness(vec![Step::Hang, Step::Hang, Step::Hang, Step::Hang]);
    let request = GenerationRequest::new(2, Difficulty::Beginner);

    let outcome = h.orchestrator.generate(&request).await;

    assert!(outcome.is_fallback());
    assert!(outcome.plan().satisfies_invariants());
    assert_eq!(h.invocations(), 4);
}
