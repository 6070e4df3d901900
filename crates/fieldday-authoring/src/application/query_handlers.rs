//! Query handlers for the Event Authoring context.
//!
//! This module contains query handlers that load stored events and return
//! read-only view DTOs.

use fieldday_core::clock::Clock;
use fieldday_core::error::DomainError;
use fieldday_core::identity::EditorIdentity;
use serde::Serialize;

use crate::application::editor::EventEditor;
use crate::application::event_store::EventStore;
use crate::domain::change_log::ChangeLogEntry;
use crate::domain::lifecycle::{ActionGuards, LifecycleState};
use crate::domain::record::EventRecord;

/// Everything a UI needs to render the editor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorView {
    /// The working copy.
    pub record: EventRecord,
    pub lifecycle: LifecycleState,
    pub guards: ActionGuards,
    /// Pending changes since the last publish, in insertion order.
    pub changes: Vec<ChangeLogEntry>,
}

/// Retrieves the editor view of an event.
///
/// Opening a published event that has no stored change log rebuilds and
/// stores one, which is why this needs a clock and an identity.
///
/// # Errors
///
/// Returns `DomainError::RecordNotFound` if the event does not exist.
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn get_editor_view(
    record_id: &str,
    clock: &dyn Clock,
    identity: &EditorIdentity,
    store: &dyn EventStore,
) -> Result<EditorView, DomainError> {
    let editor = EventEditor::open(record_id, store, clock, identity).await?;
    Ok(editor.view())
}

/// Retrieves the published snapshot of an event, as the public sees it.
///
/// # Errors
///
/// Returns `DomainError::RecordNotFound` if the event is not published.
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn get_published_event(
    record_id: &str,
    store: &dyn EventStore,
) -> Result<EventRecord, DomainError> {
    store
        .get_published(record_id)
        .await?
        .ok_or_else(|| DomainError::RecordNotFound(record_id.to_owned()))
}
