//! Command handlers for the Event Authoring context.
//!
//! Each handler opens an editing session on the stored event, runs one
//! action and returns the resulting editor view.

use fieldday_core::clock::Clock;
use fieldday_core::command::Command;
use fieldday_core::error::DomainError;
use fieldday_core::identity::EditorIdentity;
use tracing::info;

use crate::application::editor::EventEditor;
use crate::application::event_store::EventStore;
use crate::application::query_handlers::EditorView;
use crate::domain::commands::{
    CancelEvent, CreateEvent, DeleteEvent, DiscardChanges, PublishEvent, SaveDraft,
    UnpublishEvent,
};
use crate::domain::lifecycle::Transition;

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct AuthoringCommandResult {
    /// The event affected by the command.
    pub record_id: String,
    /// Whether a guarded action ran or was skipped.
    pub transition: Transition,
    /// The editor state after the command.
    pub view: EditorView,
}

impl AuthoringCommandResult {
    fn from_editor(editor: &EventEditor<'_>, transition: Transition) -> Self {
        Self {
            record_id: editor.record().id.clone(),
            transition,
            view: editor.view(),
        }
    }
}

/// Handles the `CreateEvent` command: starts from the template, applies the
/// initial fields and stores the first draft.
///
/// # Errors
///
/// Returns `DomainError::Validation` if an initial field has the wrong shape
/// and `DomainError::Infrastructure` if the draft cannot be stored.
pub async fn handle_create_event(
    command: &CreateEvent,
    clock: &dyn Clock,
    identity: &EditorIdentity,
    store: &dyn EventStore,
) -> Result<AuthoringCommandResult, DomainError> {
    info!(
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        "handling command"
    );
    let mut editor = EventEditor::create(store, clock, identity);
    editor.save(&command.fields).await?;
    Ok(AuthoringCommandResult::from_editor(
        &editor,
        Transition::Applied,
    ))
}

/// Handles the `SaveDraft` command: opens the event and applies the edits.
///
/// # Errors
///
/// Returns `DomainError::RecordNotFound` if the event does not exist, and
/// otherwise whatever [`EventEditor::save`] returns.
pub async fn handle_save_draft(
    command: &SaveDraft,
    clock: &dyn Clock,
    identity: &EditorIdentity,
    store: &dyn EventStore,
) -> Result<AuthoringCommandResult, DomainError> {
    info!(
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        record_id = %command.record_id,
        "handling command"
    );
    let mut editor = EventEditor::open(&command.record_id, store, clock, identity).await?;
    editor.save(&command.updates).await?;
    Ok(AuthoringCommandResult::from_editor(
        &editor,
        Transition::Applied,
    ))
}

/// Handles the `PublishEvent` command.
///
/// # Errors
///
/// Returns `DomainError::RecordNotFound` if the event does not exist and
/// `DomainError::MissingRequiredFields` if it is incomplete.
pub async fn handle_publish_event(
    command: &PublishEvent,
    clock: &dyn Clock,
    identity: &EditorIdentity,
    store: &dyn EventStore,
) -> Result<AuthoringCommandResult, DomainError> {
    info!(
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        record_id = %command.record_id,
        "handling command"
    );
    let mut editor = EventEditor::open(&command.record_id, store, clock, identity).await?;
    let transition = editor.publish().await?;
    Ok(AuthoringCommandResult::from_editor(&editor, transition))
}

/// Handles the `UnpublishEvent` command. A false guard yields a skipped
/// transition, not an error.
///
/// # Errors
///
/// Returns `DomainError::RecordNotFound` if the event does not exist.
pub async fn handle_unpublish_event(
    command: &UnpublishEvent,
    clock: &dyn Clock,
    identity: &EditorIdentity,
    store: &dyn EventStore,
) -> Result<AuthoringCommandResult, DomainError> {
    info!(
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        record_id = %command.record_id,
        "handling command"
    );
    let mut editor = EventEditor::open(&command.record_id, store, clock, identity).await?;
    let transition = editor.unpublish().await?;
    Ok(AuthoringCommandResult::from_editor(&editor, transition))
}

/// Handles the `CancelEvent` command.
///
/// # Errors
///
/// Returns `DomainError::RecordNotFound` if the event does not exist.
pub async fn handle_cancel_event(
    command: &CancelEvent,
    clock: &dyn Clock,
    identity: &EditorIdentity,
    store: &dyn EventStore,
) -> Result<AuthoringCommandResult, DomainError> {
    info!(
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        record_id = %command.record_id,
        "handling command"
    );
    let mut editor = EventEditor::open(&command.record_id, store, clock, identity).await?;
    let transition = editor.cancel().await?;
    Ok(AuthoringCommandResult::from_editor(&editor, transition))
}

/// Handles the `DeleteEvent` command. The returned view shows the record as
/// it was before deletion.
///
/// # Errors
///
/// Returns `DomainError::RecordNotFound` if the event does not exist.
pub async fn handle_delete_event(
    command: &DeleteEvent,
    clock: &dyn Clock,
    identity: &EditorIdentity,
    store: &dyn EventStore,
) -> Result<AuthoringCommandResult, DomainError> {
    info!(
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        record_id = %command.record_id,
        "handling command"
    );
    let mut editor = EventEditor::open(&command.record_id, store, clock, identity).await?;
    let transition = editor.delete().await?;
    Ok(AuthoringCommandResult::from_editor(&editor, transition))
}

/// Handles the `DiscardChanges` command.
///
/// # Errors
///
/// Returns `DomainError::RecordNotFound` if the event does not exist.
pub async fn handle_discard_changes(
    command: &DiscardChanges,
    clock: &dyn Clock,
    identity: &EditorIdentity,
    store: &dyn EventStore,
) -> Result<AuthoringCommandResult, DomainError> {
    info!(
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        record_id = %command.record_id,
        "handling command"
    );
    let mut editor = EventEditor::open(&command.record_id, store, clock, identity).await?;
    let transition = editor.discard().await?;
    Ok(AuthoringCommandResult::from_editor(&editor, transition))
}
