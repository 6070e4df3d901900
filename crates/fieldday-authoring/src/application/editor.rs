//! The editing session of one event: working draft, change log and the
//! guarded lifecycle transitions.

use fieldday_core::clock::Clock;
use fieldday_core::error::DomainError;
use fieldday_core::identity::EditorIdentity;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::application::change_log_store::ChangeLogStore;
use crate::application::event_store::EventStore;
use crate::application::query_handlers::EditorView;
use crate::domain::change_log::ChangeLogEntry;
use crate::domain::diff::FieldDiffEngine;
use crate::domain::lifecycle::{Guard, LifecycleState, Transition};
use crate::domain::record::{EventRecord, EventStatus, is_tracked};

/// An editing session over one event.
///
/// Transitions other than `save` write to the store first and only then
/// update the in-memory state, so a failed write leaves the session as it
/// was. `save` updates memory first and then reports a failed write, since
/// the in-memory draft is the source of truth while editing.
pub struct EventEditor<'a> {
    store: &'a dyn EventStore,
    clock: &'a dyn Clock,
    identity: &'a EditorIdentity,
    engine: FieldDiffEngine,
    record: EventRecord,
    published: Option<EventRecord>,
    changes: ChangeLogStore,
}

impl std::fmt::Debug for EventEditor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEditor")
            .field("record_id", &self.record.id)
            .field("status", &self.record.status)
            .field("pending_changes", &self.changes.entries().len())
            .finish_non_exhaustive()
    }
}

impl<'a> EventEditor<'a> {
    /// Starts a new event from the blank template. Nothing is persisted
    /// until the first save.
    #[must_use]
    pub fn create(
        store: &'a dyn EventStore,
        clock: &'a dyn Clock,
        identity: &'a EditorIdentity,
    ) -> Self {
        let now = clock.now();
        let record = EventRecord::template(format!("event-{}", now.timestamp_millis()), now);
        Self {
            store,
            clock,
            identity,
            engine: FieldDiffEngine::default(),
            record,
            published: None,
            changes: ChangeLogStore::new(),
        }
    }

    /// Opens an existing event.
    ///
    /// The working copy is the stored draft merged over the published
    /// snapshot. If the event is published but no usable change log is
    /// stored, the log is rebuilt by comparing the snapshot with the draft.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::RecordNotFound` if neither a draft nor a
    /// published snapshot exists, and `DomainError::Infrastructure` if the
    /// store fails.
    #[instrument(skip(store, clock, identity))]
    pub async fn open(
        record_id: &str,
        store: &'a dyn EventStore,
        clock: &'a dyn Clock,
        identity: &'a EditorIdentity,
    ) -> Result<Self, DomainError> {
        let published = store.get_published(record_id).await?;
        let draft = store.get_draft(record_id).await?;
        let record = match (draft, &published) {
            (Some(draft), Some(live)) => EventRecord::merge_draft(live, &draft)?,
            (Some(draft), None) => draft,
            (None, Some(live)) => live.clone(),
            (None, None) => return Err(DomainError::RecordNotFound(record_id.to_owned())),
        };

        let mut editor = Self {
            store,
            clock,
            identity,
            engine: FieldDiffEngine::default(),
            record,
            published,
            changes: ChangeLogStore::new(),
        };

        let found = editor.changes.load(store, record_id).await?;
        if found {
            editor.reconcile_change_log().await?;
        } else if editor.record.status == EventStatus::Published {
            editor.seed_change_log().await?;
        }

        Ok(editor)
    }

    /// Brings a stored log in line with the merged working copy. The merge
    /// restores published values over blank draft fields, which a stored
    /// log does not know about.
    async fn reconcile_change_log(&mut self) -> Result<(), DomainError> {
        let mut log = self.changes.log().clone();
        if !self.engine.reconcile(&mut log, &self.record.to_fields()) {
            return Ok(());
        }
        debug!(
            record_id = %self.record.id,
            entries = log.len(),
            "reconciled stored change log with working copy"
        );
        self.changes.replace(log);
        self.changes.persist(self.store, &self.record.id).await
    }

    /// Rebuilds the log by comparing the published snapshot with the draft.
    async fn seed_change_log(&mut self) -> Result<(), DomainError> {
        let Some(live) = &self.published else {
            return Ok(());
        };
        let log = self
            .engine
            .compare(&live.to_fields(), &self.record.to_fields())?;
        if log.is_empty() {
            return Ok(());
        }
        info!(
            record_id = %self.record.id,
            entries = log.len(),
            "seeded change log from published snapshot"
        );
        self.changes.replace(log);
        self.changes.persist(self.store, &self.record.id).await
    }

    /// The working copy.
    #[must_use]
    pub fn record(&self) -> &EventRecord {
        &self.record
    }

    /// The last published snapshot, if any.
    #[must_use]
    pub fn published(&self) -> Option<&EventRecord> {
        self.published.as_ref()
    }

    /// Pending changes since the last publish.
    #[must_use]
    pub fn changes(&self) -> &[ChangeLogEntry] {
        self.changes.entries()
    }

    /// Lifecycle flags, derived fresh on every call.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        LifecycleState::derive(&self.record, self.changes.log())
    }

    #[must_use]
    pub fn view(&self) -> EditorView {
        let lifecycle = self.state();
        EditorView {
            record: self.record.clone(),
            lifecycle,
            guards: lifecycle.guards(),
            changes: self.changes().to_vec(),
        }
    }

    /// Applies field edits to the draft, merges them into the change log and
    /// persists both. Status is never changed by a save.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if an update has the wrong shape, in
    /// which case nothing changes. Returns `DomainError::Infrastructure` if
    /// persisting fails; the edit is kept in memory and the stored draft or
    /// log may be behind it.
    #[instrument(skip(self, updates), fields(record_id = %self.record.id, fields = updates.len()))]
    pub async fn save(&mut self, updates: &Map<String, Value>) -> Result<(), DomainError> {
        let mut next = self.record.with_updates(updates)?;

        // Diff against the normalized values so that e.g. `100` and `100.0`
        // compare equal once they have passed through the record model.
        let previous_fields = self.record.to_fields();
        let next_fields = next.to_fields();
        let normalized: Map<String, Value> = updates
            .keys()
            .filter(|field| is_tracked(field))
            .map(|field| {
                let value = next_fields.get(field).cloned().unwrap_or(Value::Null);
                (field.clone(), value)
            })
            .collect();

        let mut log = self.changes.log().clone();
        self.engine
            .apply_update(&mut log, &previous_fields, &normalized)?;

        next.updated_at = Some(self.clock.now());
        self.record = next;
        self.changes.replace(log);

        info!(pending = self.changes.entries().len(), "saved draft");
        self.store.save_draft(&self.record).await?;
        self.changes.persist(self.store, &self.record.id).await
    }

    /// Promotes the draft to the published snapshot.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingRequiredFields` naming every blank
    /// required field, with no state change. Returns
    /// `DomainError::Infrastructure` if persisting fails.
    #[instrument(skip(self), fields(record_id = %self.record.id))]
    pub async fn publish(&mut self) -> Result<Transition, DomainError> {
        let missing = self.record.missing_required_fields();
        if !missing.is_empty() {
            return Err(DomainError::MissingRequiredFields(missing));
        }

        let now = self.clock.now();
        let mut promoted = self.record.clone();
        promoted.status = EventStatus::Published;
        promoted.organizer = Some(self.identity.display_name.clone());
        promoted.organizer_id = Some(self.identity.user_id.clone());
        promoted.updated_at = Some(now);
        promoted.published_at = Some(now);
        promoted.cancelled_at = None;

        self.store.publish(&promoted).await?;
        self.store.delete_draft(&promoted.id).await?;
        self.store.set_change_log(&promoted.id, &[]).await?;

        self.record = promoted.clone();
        self.published = Some(promoted);
        self.changes.clear();
        info!("published event");
        Ok(Transition::Applied)
    }

    /// Takes a published event without registrations back to draft. The
    /// content is kept as the stored draft.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if persisting fails.
    #[instrument(skip(self), fields(record_id = %self.record.id))]
    pub async fn unpublish(&mut self) -> Result<Transition, DomainError> {
        if !self.state().can_unpublish() {
            return Ok(skipped(Guard::CanUnpublish));
        }

        let mut next = self.record.clone();
        next.status = EventStatus::Draft;
        next.updated_at = Some(self.clock.now());

        self.store.save_draft(&next).await?;
        self.store.unpublish(&next.id).await?;
        self.store.set_change_log(&next.id, &[]).await?;

        self.record = next;
        self.published = None;
        self.changes.clear();
        info!("unpublished event");
        Ok(Transition::Applied)
    }

    /// Cancels a published event: it becomes a draft that remembers it was
    /// published, and leaves the published store.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if persisting fails.
    #[instrument(skip(self), fields(record_id = %self.record.id))]
    pub async fn cancel(&mut self) -> Result<Transition, DomainError> {
        if !self.state().can_cancel() {
            return Ok(skipped(Guard::CanCancel));
        }

        let now = self.clock.now();
        let mut next = self.record.clone();
        next.status = EventStatus::Draft;
        next.cancelled_at = Some(now);
        next.updated_at = Some(now);

        self.store.save_draft(&next).await?;
        self.store.unpublish(&next.id).await?;
        self.store.set_change_log(&next.id, &[]).await?;

        self.record = next;
        self.published = None;
        self.changes.clear();
        info!("cancelled event");
        Ok(Transition::Applied)
    }

    /// Removes every persisted trace of the event. The in-memory copy stays
    /// readable so the caller can still show what was deleted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if persisting fails.
    #[instrument(skip(self), fields(record_id = %self.record.id))]
    pub async fn delete(&mut self) -> Result<Transition, DomainError> {
        if !self.state().can_delete() {
            return Ok(skipped(Guard::CanDelete));
        }

        let id = self.record.id.clone();
        self.store.delete_draft(&id).await?;
        self.store.unpublish(&id).await?;
        self.store.set_change_log(&id, &[]).await?;

        self.published = None;
        self.changes.clear();
        info!("deleted event");
        Ok(Transition::Applied)
    }

    /// Abandons unpublished edits by restoring the published snapshot.
    /// Without a snapshot there is nothing to restore and this is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if persisting fails.
    #[instrument(skip(self), fields(record_id = %self.record.id))]
    pub async fn discard(&mut self) -> Result<Transition, DomainError> {
        let Some(live) = self.published.clone() else {
            return Ok(skipped(Guard::CanDiscard));
        };

        self.store.delete_draft(&live.id).await?;
        self.store.set_change_log(&live.id, &[]).await?;

        self.record = live;
        self.changes.clear();
        info!("discarded unpublished changes");
        Ok(Transition::Applied)
    }
}

fn skipped(guard: Guard) -> Transition {
    debug!(?guard, "lifecycle action skipped");
    Transition::Skipped(guard)
}
