//! In-process key-value store. Nothing survives the process.

use crate::clock::{Clock, SystemClock};
use crate::error::StorageError;
use crate::store::{validate_key, KeyValueStore, StoredEntry};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, StoredEntry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for MemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        validate_key(key)?;
        let now = self.clock.now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }
        // Expired: re-check under the write lock, a writer may have refreshed it.
        let mut entries = self.entries.write();
        if entries.get(key).map(|e| e.is_expired(now)).unwrap_or(false) {
            entries.remove(key);
        }
        Ok(entries.get(key).map(|e| e.value.clone()))
    }

    fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<(), StorageError> {
        validate_key(key)?;
        let entry = StoredEntry::new(value, ttl, self.clock.now());
        self.entries.write().insert(key.to_string(), entry);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.entries.write().remove(key);
        Ok(())
    }
}
