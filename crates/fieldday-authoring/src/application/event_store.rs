//! Persistence port for drafts, published snapshots and change logs.

use std::sync::Arc;

use async_trait::async_trait;
use fieldday_core::error::DomainError;
use fieldday_core::store::KeyValueStore;
use tracing::warn;

use crate::domain::change_log::ChangeLogEntry;
use crate::domain::record::EventRecord;

/// Storage for the three per-record concerns of an editing session.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Loads the stored working draft.
    async fn get_draft(&self, record_id: &str) -> Result<Option<EventRecord>, DomainError>;

    /// Stores `record` as the working draft for its id.
    async fn save_draft(&self, record: &EventRecord) -> Result<(), DomainError>;

    async fn delete_draft(&self, record_id: &str) -> Result<(), DomainError>;

    /// Loads the last published snapshot.
    async fn get_published(&self, record_id: &str) -> Result<Option<EventRecord>, DomainError>;

    /// Stores `record` as the published snapshot for its id.
    async fn publish(&self, record: &EventRecord) -> Result<(), DomainError>;

    /// Removes the published snapshot.
    async fn unpublish(&self, record_id: &str) -> Result<(), DomainError>;

    /// Loads the persisted change log. A log that cannot be read back is
    /// reported as `None` so callers can rebuild it.
    async fn get_change_log(
        &self,
        record_id: &str,
    ) -> Result<Option<Vec<ChangeLogEntry>>, DomainError>;

    /// Stores the change log; an empty log removes it.
    async fn set_change_log(
        &self,
        record_id: &str,
        entries: &[ChangeLogEntry],
    ) -> Result<(), DomainError>;
}

/// Storage key of the working draft.
#[must_use]
pub fn draft_key(record_id: &str) -> String {
    format!("event-draft:{record_id}")
}

/// Storage key of the published snapshot.
#[must_use]
pub fn published_key(record_id: &str) -> String {
    format!("event-published:{record_id}")
}

/// Storage key of the change log.
#[must_use]
pub fn change_log_key(record_id: &str) -> String {
    format!("event-changes:{record_id}")
}

/// [`EventStore`] over a string-keyed [`KeyValueStore`], one key per record
/// and concern.
#[derive(Clone)]
pub struct KeyValueEventStore {
    kv: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for KeyValueEventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValueEventStore").finish_non_exhaustive()
    }
}

impl KeyValueEventStore {
    /// Creates a new `KeyValueEventStore`.
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    async fn get_record(&self, key: &str) -> Result<Option<EventRecord>, DomainError> {
        let Some(value) = self.kv.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| DomainError::Infrastructure(format!("corrupt record at {key}: {e}")))
    }

    async fn set_record(&self, key: &str, record: &EventRecord) -> Result<(), DomainError> {
        let value = serde_json::to_value(record)
            .map_err(|e| DomainError::Infrastructure(format!("record serialization failed: {e}")))?;
        self.kv.set(key, value).await
    }
}

#[async_trait]
impl EventStore for KeyValueEventStore {
    async fn get_draft(&self, record_id: &str) -> Result<Option<EventRecord>, DomainError> {
        self.get_record(&draft_key(record_id)).await
    }

    async fn save_draft(&self, record: &EventRecord) -> Result<(), DomainError> {
        self.set_record(&draft_key(&record.id), record).await
    }

    async fn delete_draft(&self, record_id: &str) -> Result<(), DomainError> {
        self.kv.remove(&draft_key(record_id)).await
    }

    async fn get_published(&self, record_id: &str) -> Result<Option<EventRecord>, DomainError> {
        self.get_record(&published_key(record_id)).await
    }

    async fn publish(&self, record: &EventRecord) -> Result<(), DomainError> {
        self.set_record(&published_key(&record.id), record).await
    }

    async fn unpublish(&self, record_id: &str) -> Result<(), DomainError> {
        self.kv.remove(&published_key(record_id)).await
    }

    async fn get_change_log(
        &self,
        record_id: &str,
    ) -> Result<Option<Vec<ChangeLogEntry>>, DomainError> {
        let key = change_log_key(record_id);
        let Some(value) = self.kv.get(&key).await? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(entries) => Ok(Some(entries)),
            Err(e) => {
                warn!(record_id, error = %e, "ignoring malformed change log");
                Ok(None)
            }
        }
    }

    async fn set_change_log(
        &self,
        record_id: &str,
        entries: &[ChangeLogEntry],
    ) -> Result<(), DomainError> {
        let key = change_log_key(record_id);
        if entries.is_empty() {
            return self.kv.remove(&key).await;
        }
        let value = serde_json::to_value(entries).map_err(|e| {
            DomainError::Infrastructure(format!("change log serialization failed: {e}"))
        })?;
        self.kv.set(&key, value).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use fieldday_core::error::DomainError;
    use fieldday_test_support::{FailingKeyValueStore, RecordingKeyValueStore, StoreOp};
    use serde_json::json;

    use super::*;

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
    async fn test_records_are_scoped_per_id_and_concern() {
        // Arrange
        let kv = Arc::new(RecordingKeyValueStore::new());
        let store = KeyValueEventStore::new(kv.clone());
        let mut draft = EventRecord::template("event-1", Utc::now());
        draft.name = "Draft name".into();
        let mut live = EventRecord::template("event-1", Utc::now());
        live.name = "Live name".into();

        // Act
        store.save_draft(&draft).await.unwrap();
        store.publish(&live).await.unwrap();

        // Assert
        assert_eq!(kv.keys(), vec!["event-draft:event-1", "event-published:event-1"]);
        assert_eq!(store.get_draft("event-1").await.unwrap().unwrap().name, "Draft name");
        assert_eq!(store.get_published("event-1").await.unwrap().unwrap().name, "Live name");
        assert!(store.get_draft("event-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_change_log_removes_key() {
        let kv = Arc::new(RecordingKeyValueStore::new());
        let store = KeyValueEventStore::new(kv.clone());

        store.set_change_log("event-1", &[entry("name")]).await.unwrap();
        store.set_change_log("event-1", &[]).await.unwrap();

        assert!(kv.value("event-changes:event-1").is_none());
        assert_eq!(
            kv.ops().last(),
            Some(&StoreOp::Remove("event-changes:event-1".into()))
        );
        assert!(store.get_change_log("event-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_change_log_round_trips_in_camel_case() {
        let kv = Arc::new(RecordingKeyValueStore::new());
        let store = KeyValueEventStore::new(kv.clone());

        store.set_change_log("event-1", &[entry("name")]).await.unwrap();

        let stored = kv.value("event-changes:event-1").unwrap();
        assert_eq!(stored[0]["fieldName"], json!("name"));
        assert_eq!(stored[0]["rawOld"], json!("\"a\""));
        let loaded = store.get_change_log("event-1").await.unwrap().unwrap();
        assert_eq!(loaded, vec![entry("name")]);
    }

    #[tokio::test]
    async fn test_malformed_change_log_reads_as_missing() {
        let kv = Arc::new(RecordingKeyValueStore::with_entries([(
            "event-changes:event-1".to_owned(),
            json!({ "not": "a list" }),
        )]));
        let store = KeyValueEventStore::new(kv);

        let loaded = store.get_change_log("event-1").await.unwrap();

        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_record_is_an_infrastructure_error() {
        let kv = Arc::new(RecordingKeyValueStore::with_entries([(
            "event-published:event-1".to_owned(),
            json!("garbage"),
        )]));
        let store = KeyValueEventStore::new(kv);

        let result = store.get_published("event-1").await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }

    #[tokio::test]
    async fn test_storage_failures_propagate() {
        let store = KeyValueEventStore::new(Arc::new(FailingKeyValueStore));

        let result = store.get_draft("event-1").await;

        match result {
            Err(DomainError::Infrastructure(msg)) => assert_eq!(msg, "connection refused"),
            other => panic!("expected Infrastructure, got {other:?}"),
        }
    }
}
