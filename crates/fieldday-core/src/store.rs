//! Durable key-value storage abstraction.

use async_trait::async_trait;

use crate::error::DomainError;

/// String-keyed JSON storage with per-key isolation.
///
/// Writes complete before the returned future resolves, so a subsequent
/// `get` observes the most recent completed `set` or `remove`. Concurrent
/// writers to the same key are last-write-wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, DomainError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), DomainError>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), DomainError>;
}
