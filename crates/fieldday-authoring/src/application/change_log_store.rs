//! The session's change log and its persistence.

use fieldday_core::error::DomainError;

use crate::application::event_store::EventStore;
use crate::domain::change_log::{ChangeLog, ChangeLogEntry};

/// Holds the change log of the record being edited and writes it through an
/// [`EventStore`], keyed by record id.
#[derive(Debug, Default, Clone)]
pub struct ChangeLogStore {
    log: ChangeLog,
}

impl ChangeLogStore {
    /// Creates a store holding an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the in-memory log with the persisted one for `record_id`.
    /// Returns `false`, leaving the log empty, when nothing usable is stored.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store cannot be read.
    pub async fn load(
        &mut self,
        store: &dyn EventStore,
        record_id: &str,
    ) -> Result<bool, DomainError> {
        match store.get_change_log(record_id).await? {
            Some(entries) => {
                self.log = ChangeLog::from_entries(entries);
                Ok(true)
            }
            None => {
                self.log.clear();
                Ok(false)
            }
        }
    }

    /// Writes the current log for `record_id`; an empty log removes the key.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the write fails. The in-memory
    /// log is unaffected.
    pub async fn persist(&self, store: &dyn EventStore, record_id: &str) -> Result<(), DomainError> {
        store.set_change_log(record_id, self.log.entries()).await
    }

    /// Empties the in-memory log.
    pub fn clear(&mut self) {
        self.log.clear();
    }

    #[must_use]
    pub fn log(&self) -> &ChangeLog {
        &self.log
    }

    #[must_use]
    pub fn entries(&self) -> &[ChangeLogEntry] {
        self.log.entries()
    }

    /// Replaces the in-memory log.
    pub fn replace(&mut self, log: ChangeLog) {
        self.log = log;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fieldday_test_support::RecordingKeyValueStore;
    use serde_json::json;

    use super::*;
    use crate::application::event_store::KeyValueEventStore;

    fn entry(field: &str) -> ChangeLogEntry {
        ChangeLogEntry {
            field: field.into(),
            field_name: field.into(),
            old_value: "a".into(),
            new_value: "b".into(),
            raw_old: "\"a\"".into(),
            raw_new: "\"b\"".into(),
        }
    }

    #[tokio::test]
    async fn test_persist_then_load_restores_entries() {
        // Arrange
        let store = KeyValueEventStore::new(Arc::new(RecordingKeyValueStore::new()));
        let mut changes = ChangeLogStore::new();
        changes.replace(ChangeLog::from_entries(vec![entry("name"), entry("location")]));

        // Act
        changes.persist(&store, "event-1").await.unwrap();
        let mut reloaded = ChangeLogStore::new();
        let found = reloaded.load(&store, "event-1").await.unwrap();

        // Assert
        assert!(found);
        assert_eq!(reloaded.entries(), changes.entries());
    }

    #[tokio::test]
    async fn test_logs_of_different_records_do_not_collide() {
        let store = KeyValueEventStore::new(Arc::new(RecordingKeyValueStore::new()));
        let mut first = ChangeLogStore::new();
        first.replace(ChangeLog::from_entries(vec![entry("name")]));
        first.persist(&store, "event-1").await.unwrap();

        let mut second = ChangeLogStore::new();
        let found = second.load(&store, "event-2").await.unwrap();

        assert!(!found);
        assert!(second.entries().is_empty());
    }

    #[tokio::test]
    async fn test_load_of_malformed_log_reports_missing() {
        let kv = RecordingKeyValueStore::with_entries([(
            "event-changes:event-1".to_owned(),
            json!([{ "field": 7 }]),
        )]);
        let store = KeyValueEventStore::new(Arc::new(kv));
        let mut changes = ChangeLogStore::new();
        changes.replace(ChangeLog::from_entries(vec![entry("stale")]));

        let found = changes.load(&store, "event-1").await.unwrap();

        assert!(!found);
        assert!(changes.entries().is_empty());
    }

    #[tokio::test]
    async fn test_clear_then_persist_removes_stored_log() {
        let kv = Arc::new(RecordingKeyValueStore::new());
        let store = KeyValueEventStore::new(kv.clone());
        let mut changes = ChangeLogStore::new();
        changes.replace(ChangeLog::from_entries(vec![entry("name")]));
        changes.persist(&store, "event-1").await.unwrap();

        changes.clear();
        changes.persist(&store, "event-1").await.unwrap();

        assert!(kv.value("event-changes:event-1").is_none());
    }
}
