//! Commands for the Event Authoring context.

use fieldday_core::command::Command;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Command to start a new event from the blank template.
#[derive(Debug, Clone)]
pub struct CreateEvent {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Initial field values; may be empty.
    pub fields: Map<String, Value>,
}

impl Command for CreateEvent {
    fn command_type(&self) -> &'static str {
        "authoring.create_event"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to apply field edits to the working draft.
#[derive(Debug, Clone)]
pub struct SaveDraft {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The event being edited.
    pub record_id: String,
    /// Field name to new value.
    pub updates: Map<String, Value>,
}

impl Command for SaveDraft {
    fn command_type(&self) -> &'static str {
        "authoring.save_draft"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to promote the working draft to the published snapshot.
#[derive(Debug, Clone)]
pub struct PublishEvent {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The event to publish.
    pub record_id: String,
}

impl Command for PublishEvent {
    fn command_type(&self) -> &'static str {
        "authoring.publish_event"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to take a published event back to draft.
#[derive(Debug, Clone)]
pub struct UnpublishEvent {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The event to unpublish.
    pub record_id: String,
}

impl Command for UnpublishEvent {
    fn command_type(&self) -> &'static str {
        "authoring.unpublish_event"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to cancel a published event.
#[derive(Debug, Clone)]
pub struct CancelEvent {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The event to cancel.
    pub record_id: String,
}

impl Command for CancelEvent {
    fn command_type(&self) -> &'static str {
        "authoring.cancel_event"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to delete every persisted trace of an event.
#[derive(Debug, Clone)]
pub struct DeleteEvent {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The event to delete.
    pub record_id: String,
}

impl Command for DeleteEvent {
    fn command_type(&self) -> &'static str {
        "authoring.delete_event"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to abandon unpublished edits.
#[derive(Debug, Clone)]
pub struct DiscardChanges {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The event whose edits are discarded.
    pub record_id: String,
}

impl Command for DiscardChanges {
    fn command_type(&self) -> &'static str {
        "authoring.discard_changes"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
