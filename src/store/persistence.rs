//! Persistence layer for the key-value store

use crate::clock::{Clock, SystemClock};
use crate::error::StorageError;
use crate::store::{validate_key, KeyValueStore, StoredEntry};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Sled-based implementation of KeyValueStore
pub struct SledKeyValueStore {
    db: sled::Db,
    clock: Arc<dyn Clock>,
}

impl SledKeyValueStore {
    /// Open (or create) a store at the given directory.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        Self::with_clock(path, Arc::new(SystemClock))
    }

    pub fn with_clock<P: AsRef<Path>>(path: P, clock: Arc<dyn Clock>) -> Result<Self, StorageError> {
        let db = sled::open(path.as_ref()).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to open sled database: {}", e),
            ))
        })?;
        Ok(Self { db, clock })
    }

    /// Wrap an already opened database.
    pub fn from_db(db: sled::Db) -> Self {
        Self {
            db,
            clock: Arc::new(SystemClock),
        }
    }

    /// Get the underlying sled database (for advanced operations)
    pub fn db(&self) -> &sled::Db {
        &self.db
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

impl KeyValueStore for SledKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        validate_key(key)?;
        let Some(raw) = self.db.get(key.as_bytes())? else {
            return Ok(None);
        };
        let entry: StoredEntry = bincode::deserialize(&raw).map_err(|e| StorageError::Decode {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        if entry.is_expired(self.clock.now()) {
            debug!(key, "Dropping expired store entry");
            self.db.remove(key.as_bytes())?;
            return Ok(None);
        }
        Ok(Some(entry.value))
    }

    fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<(), StorageError> {
        validate_key(key)?;
        let entry = StoredEntry::new(value, ttl, self.clock.now());
        let encoded = bincode::serialize(&entry).map_err(|e| StorageError::Encode {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.db.insert(key.as_bytes(), encoded)?;
        self.db.flush()?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.db.remove(key.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }
}
