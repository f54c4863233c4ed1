//! Property-based tests for the deterministic template fallback

use planwright::generation::{
    build_fallback, validate_plan, Difficulty, GenerationRequest, PlanSchema, MAX_DAYS,
};
use proptest::prelude::*;

fn request() -> impl Strategy<Value = GenerationRequest> {
    let difficulty = prop_oneof![
        Just(Difficulty::Beginner),
        Just(Difficulty::Intermediate),
        Just(Difficulty::Advanced),
    ];
    let focus = proptest::collection::vec(
        prop_oneof![
            Just("core".to_string()),
            Just("cardio".to_string()),
            Just("glutes".to_string()),
            "[a-z]{0,10}",
        ],
        0..4,
    );
    (0u32..=30, difficulty, focus).prop_map(|(frequency, difficulty, focus)| {
        GenerationRequest::new(frequency, difficulty).with_focus(focus)
    })
}

#[test]
fn test_fallback_is_deterministic() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&request(), |request| {
            assert_eq!(build_fallback(&request), build_fallback(&request.clone()));
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_fallback_day_count_and_invariants() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&request(), |request| {
            let plan = build_fallback(&request);
            let expected = request.frequency.clamp(1, MAX_DAYS) as usize;

            assert_eq!(plan.schedule.len(), expected);
            assert!(plan.satisfies_invariants());
            for (index, day) in plan.schedule.iter().enumerate() {
                assert_eq!(day.label, format!("Day {}", index + 1));
                assert!(!day.items.is_empty());
            }

            Ok(())
        })
        .unwrap();
}

#[test]
fn test_fallback_passes_its_own_validator() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&request(), |request| {
            let plan = build_fallback(&request);
            let document = serde_json::to_value(&plan).unwrap();

            let validated = validate_plan(&document, &PlanSchema::for_request(&request));
            let validated = validated.map_err(|report| {
                TestCaseError::fail(format!("template rejected: {}", report))
            })?;
            assert_eq!(validated.schedule.len(), plan.schedule.len());

            Ok(())
        })
        .unwrap();
}
