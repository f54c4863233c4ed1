//! Integration tests for the key-value stores backing the circuit

use chrono::{TimeZone, Utc};
use planwright::clock::ManualClock;
use planwright::store::{KeyValueStore, MemoryKeyValueStore, SledKeyValueStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
    ))
}

/// Same behavioural contract for every implementation.
fn exercise_store(store: &dyn KeyValueStore, clock: &ManualClock) {
    assert_eq!(store.get("missing").unwrap(), None);

    store.set("plain", b"forever", None).unwrap();
    store
        .set("short", b"brief", Some(Duration::from_secs(30)))
        .unwrap();
    assert_eq!(store.get("short").unwrap(), Some(b"brief".to_vec()));

    clock.advance(Duration::from_secs(29));
    assert!(store.get("short").unwrap().is_some());

    clock.advance(Duration::from_secs(2));
    assert_eq!(store.get("short").unwrap(), None);
    assert_eq!(store.get("plain").unwrap(), Some(b"forever".to_vec()));

    store.set("plain", b"replaced", None).unwrap();
    assert_eq!(store.get("plain").unwrap(), Some(b"replaced".to_vec()));

    store.delete("plain").unwrap();
    store.delete("plain").unwrap();
    assert_eq!(store.get("plain").unwrap(), None);

    assert!(store.set("  ", b"x", None).is_err());
}

#[test]
fn test_sled_store_contract() {
    let dir = TempDir::new().unwrap();
    let clock = clock();
    let store = SledKeyValueStore::with_clock(dir.path(), clock.clone()).unwrap();
    exercise_store(&store, &clock);
}

#[test]
fn test_memory_store_contract() {
    let clock = clock();
    let store = MemoryKeyValueStore::with_clock(clock.clone());
    exercise_store(&store, &clock);
}

#[test]
fn test_sled_values_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let clock = clock();
    {
        let store = SledKeyValueStore::with_clock(dir.path(), clock.clone()).unwrap();
        store
            .set("circuit.tripped", b"\x01", Some(Duration::from_secs(600)))
            .unwrap();
        store.flush().unwrap();
    }

    let store = SledKeyValueStore::with_clock(dir.path(), clock.clone()).unwrap();
    assert_eq!(store.get("circuit.tripped").unwrap(), Some(vec![1]));

    clock.advance(Duration::from_secs(601));
    assert_eq!(store.get("circuit.tripped").unwrap(), None);
}
