//! Key-Value Store
//!
//! Small persistent key-value surface used for state that must survive
//! restarts (currently the rate-limit circuit). Values carry an optional
//! time-to-live; expired entries read as absent.

pub mod memory;
pub mod persistence;

pub use memory::MemoryKeyValueStore;
pub use persistence::SledKeyValueStore;

use crate::error::StorageError;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Key-value store interface
///
/// Implementations must tolerate concurrent readers. Writes are
/// last-writer-wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<(), StorageError>;
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Stored value plus its expiry, shared by every implementation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredEntry {
    pub value: Vec<u8>,
    /// Milliseconds since the Unix epoch; `None` never expires.
    pub expires_at_ms: Option<i64>,
}

impl StoredEntry {
    pub fn new(value: &[u8], ttl: Option<Duration>, now: DateTime<Utc>) -> Self {
        let expires_at_ms = ttl.map(|ttl| {
            let ttl = ChronoDuration::from_std(ttl).unwrap_or(ChronoDuration::MAX);
            now.checked_add_signed(ttl)
                .map(|at| at.timestamp_millis())
                .unwrap_or(i64::MAX)
        });
        Self {
            value: value.to_vec(),
            expires_at_ms,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at_ms
            .map(|at| now.timestamp_millis() > at)
            .unwrap_or(false)
    }
}

pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.trim().is_empty() {
        return Err(StorageError::InvalidKey("key cannot be empty".to_string()));
    }
    Ok(())
}
