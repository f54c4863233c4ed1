//! Property-based tests for text repair

use planwright::generation::repair;
use proptest::prelude::*;
use serde_json::{Map, Value};

/// Flat JSON objects with alphabetic keys and simple scalar values.
fn flat_object() -> impl Strategy<Value = Value> {
    let scalar = prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[a-z ]{0,12}".prop_map(Value::from),
    ];
    proptest::collection::btree_map("[a-z]{1,8}", scalar, 1..6).prop_map(|entries| {
        Value::Object(entries.into_iter().collect::<Map<String, Value>>())
    })
}

/// Prose without brackets, braces or backticks.
fn prose() -> impl Strategy<Value = String> {
    "[A-Za-z ,.!:]{0,40}"
}

#[test]
fn test_valid_json_is_returned_unchanged() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&flat_object(), |value| {
            let compact = serde_json::to_string(&value).unwrap();
            let pretty = serde_json::to_string_pretty(&value).unwrap();

            assert_eq!(repair(&compact).unwrap(), value);
            assert_eq!(repair(&pretty).unwrap(), value);

            Ok(())
        })
        .unwrap();
}

#[test]
fn test_object_is_recovered_from_fenced_prose() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(flat_object(), prose(), prose(), any::<bool>()),
            |(value, before, after, tagged)| {
                let fence = if tagged { "```json" } else { "```" };
                let text = format!(
                    "{}\n{}\n{}\n```\n{}",
                    before,
                    fence,
                    serde_json::to_string_pretty(&value).unwrap(),
                    after
                );

                assert_eq!(repair(&text).unwrap(), value);

                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn test_trailing_commas_are_tolerated() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&flat_object(), |value| {
            let compact = serde_json::to_string(&value).unwrap();
            let with_comma = format!("{},}}", &compact[..compact.len() - 1]);

            assert_eq!(repair(&with_comma).unwrap(), value);

            Ok(())
        })
        .unwrap();
}

#[test]
fn test_repair_never_panics() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&any::<String>(), |text| {
            let _ = repair(&text);
            Ok(())
        })
        .unwrap();
}
