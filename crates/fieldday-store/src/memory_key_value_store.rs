//! In-process `KeyValueStore`, used when no database is configured.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use fieldday_core::error::DomainError;
use fieldday_core::store::KeyValueStore;

/// Key-value store held in memory. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryKeyValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> DomainError {
    DomainError::Infrastructure("memory store lock poisoned".to_owned())
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, DomainError> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), DomainError> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), DomainError> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_set_then_get_returns_value() {
        // Arrange
        let store = MemoryKeyValueStore::new();

        // Act
        store.set("event-draft:event-1", json!({ "name": "Cup" })).await.unwrap();

        // Assert
        let value = store.get("event-draft:event-1").await.unwrap();
        assert_eq!(value, Some(json!({ "name": "Cup" })));
    }

    #[tokio::test]
    async fn test_set_overwrites_previous_value() {
        let store = MemoryKeyValueStore::new();
        store.set("k", json!(1)).await.unwrap();

        store.set("k", json!(2)).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn test_remove_absent_key_is_ok() {
        let store = MemoryKeyValueStore::new();
        store.set("k", json!(1)).await.unwrap();

        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();

        assert!(store.get("k").await.unwrap().is_none());
    }
}
