//! Test stores — mock `KeyValueStore` implementations for tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use fieldday_core::error::DomainError;
use fieldday_core::store::KeyValueStore;

/// A single write observed by a [`RecordingKeyValueStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOp {
    /// `set(key, value)` was called.
    Set(String, serde_json::Value),
    /// `remove(key)` was called.
    Remove(String),
}

/// An in-memory store that keeps values and records every write.
///
/// Optionally rejects writes, which lets tests observe how callers surface
/// persistence failures while reads keep working.
#[derive(Debug, Default)]
pub struct RecordingKeyValueStore {
    values: Mutex<BTreeMap<String, serde_json::Value>>,
    ops: Mutex<Vec<StoreOp>>,
    fail_writes: Mutex<bool>,
}

impl RecordingKeyValueStore {
    /// Creates an empty recording store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        let store = Self::default();
        store.values.lock().unwrap().extend(entries);
        store
    }

    /// Makes every subsequent `set`/`remove` fail with an infrastructure error.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn fail_writes(&self) {
        *self.fail_writes.lock().unwrap() = true;
    }

    /// Returns the value currently stored under `key`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn value(&self, key: &str) -> Option<serde_json::Value> {
        self.values.lock().unwrap().get(key).cloned()
    }

    /// Returns all keys currently stored, sorted.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn keys(&self) -> Vec<String> {
        self.values.lock().unwrap().keys().cloned().collect()
    }

    /// Returns a snapshot of every write, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn ops(&self) -> Vec<StoreOp> {
        self.ops.lock().unwrap().clone()
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if *self.fail_writes.lock().unwrap() {
            return Err(DomainError::Infrastructure("disk full".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for RecordingKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, DomainError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), DomainError> {
        self.check_writable()?;
        self.ops
            .lock()
            .unwrap()
            .push(StoreOp::Set(key.to_owned(), value.clone()));
        self.values.lock().unwrap().insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), DomainError> {
        self.check_writable()?;
        self.ops.lock().unwrap().push(StoreOp::Remove(key.to_owned()));
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

/// A store that always returns an infrastructure error. Useful for testing
/// error-handling paths.
#[derive(Debug)]
pub struct FailingKeyValueStore;

#[async_trait]
impl KeyValueStore for FailingKeyValueStore {
    async fn get(&self, _key: &str) -> Result<Option<serde_json::Value>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn set(&self, _key: &str, _value: serde_json::Value) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn remove(&self, _key: &str) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
