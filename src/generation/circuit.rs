//! Circuit-Breaker State
//!
//! Remembers an upstream rate-limit signal across calls and restarts.
//!
//! State machine: `Clear -> Tripped` when the generation client sees a
//! rate-limit signal, `Tripped -> Clear` on [`CircuitBreaker::clear`] or once
//! `now - tripped_at > ttl` (checked lazily on read). Only
//! [`GenerationClient`](crate::generation::client::GenerationClient) trips the
//! circuit, which is why [`CircuitBreaker::trip`] is crate-private.
//!
//! Writes are last-writer-wins; a stale read costs one extra upstream call.

use crate::clock::Clock;
use crate::error::StorageError;
use crate::store::KeyValueStore;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Trip flag; holds the TTL in milliseconds.
pub const TRIP_FLAG_KEY: &str = "circuit.tripped";
/// Trip timestamp in Unix milliseconds.
pub const TRIPPED_AT_KEY: &str = "circuit.tripped_at";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitState {
    pub tripped: bool,
    pub tripped_at: DateTime<Utc>,
    #[serde(with = "duration_secs")]
    pub ttl: Duration,
}

impl CircuitState {
    pub fn expires_at(&self) -> DateTime<Utc> {
        chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| self.tripped_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Time left before the circuit clears itself.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at() - now).to_std().unwrap_or(Duration::ZERO)
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at()
    }
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }
}

pub struct CircuitBreaker {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

impl CircuitBreaker {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, default_ttl: Duration) -> Self {
        Self {
            store,
            clock,
            default_ttl,
        }
    }

    /// TTL applied when the client trips the circuit.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Whether network-calling strategies must be skipped.
    ///
    /// Store failures read as "clear": the flag is advisory.
    pub fn is_tripped(&self) -> bool {
        match self.state() {
            Ok(state) => state.is_some(),
            Err(err) => {
                warn!(error = %err, "Circuit state unreadable, treating as clear");
                false
            }
        }
    }

    /// Current trip, if any. Clears an expired trip as a side effect.
    pub fn state(&self) -> Result<Option<CircuitState>, StorageError> {
        let Some(ttl_bytes) = self.store.get(TRIP_FLAG_KEY)? else {
            return Ok(None);
        };
        let ttl_ms: u64 = decode(TRIP_FLAG_KEY, &ttl_bytes)?;

        let tripped_at = match self.store.get(TRIPPED_AT_KEY)? {
            Some(bytes) => {
                let millis: i64 = decode(TRIPPED_AT_KEY, &bytes)?;
                Utc.timestamp_millis_opt(millis).single()
            }
            None => None,
        };
        // A flag without a readable timestamp cannot be aged; drop it.
        let Some(tripped_at) = tripped_at else {
            self.clear()?;
            return Ok(None);
        };

        let state = CircuitState {
            tripped: true,
            tripped_at,
            ttl: Duration::from_millis(ttl_ms),
        };
        if state.is_expired(self.clock.now()) {
            debug!(tripped_at = %state.tripped_at, "Circuit trip expired");
            self.clear()?;
            return Ok(None);
        }
        Ok(Some(state))
    }

    pub(crate) fn trip(&self, ttl: Duration) -> Result<(), StorageError> {
        let now = self.clock.now();
        let ttl_ms = ttl.as_millis().min(u64::MAX as u128) as u64;
        self.store
            .set(TRIPPED_AT_KEY, &encode(TRIPPED_AT_KEY, &now.timestamp_millis())?, Some(ttl))?;
        self.store
            .set(TRIP_FLAG_KEY, &encode(TRIP_FLAG_KEY, &ttl_ms)?, Some(ttl))?;
        info!(ttl_secs = ttl.as_secs(), "Circuit tripped after rate-limit signal");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.delete(TRIP_FLAG_KEY)?;
        self.store.delete(TRIPPED_AT_KEY)?;
        debug!("Circuit cleared");
        Ok(())
    }
}

fn encode<T: Serialize>(key: &str, value: &T) -> Result<Vec<u8>, StorageError> {
    bincode::serialize(value).map_err(|e| StorageError::Encode {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn decode<T: serde::de::DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T, StorageError> {
    bincode::deserialize(bytes).map_err(|e| StorageError::Decode {
        key: key.to_string(),
        message: e.to_string(),
    })
}
