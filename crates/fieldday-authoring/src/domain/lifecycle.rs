//! Derived lifecycle state and action guards.
//!
//! Nothing here is stored. The state is recomputed from the working record
//! and the change log every time it is read.

use serde::Serialize;

use super::change_log::ChangeLog;
use super::record::{EventRecord, EventStatus};

/// A precondition that gates a lifecycle action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Guard {
    CanUnpublish,
    CanCancel,
    CanDelete,
    /// Discarding needs a published snapshot to restore.
    CanDiscard,
}

/// Outcome of a guarded lifecycle action.
///
/// A false guard is not an error: the action simply does nothing, since
/// the UI is expected to have disabled the affordance already.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome", content = "guard")]
pub enum Transition {
    /// The action ran and its effects were persisted.
    Applied,
    /// The action was a no-op because `Guard` was false.
    Skipped(Guard),
}

impl Transition {
    #[must_use]
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

/// Lifecycle flags derived from a record and its pending changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleState {
    pub is_published: bool,
    /// A draft that was published before and then cancelled.
    pub is_cancelled: bool,
    pub has_registrations: bool,
    pub has_unpublished_changes: bool,
}

impl LifecycleState {
    /// Derives the state of `record` with pending `changes`.
    #[must_use]
    pub fn derive(record: &EventRecord, changes: &ChangeLog) -> Self {
        let is_published = record.status == EventStatus::Published;
        Self {
            is_published,
            is_cancelled: !is_published && record.cancelled_at.is_some(),
            has_registrations: record.has_registrations(),
            has_unpublished_changes: is_published && !changes.is_empty(),
        }
    }

    #[must_use]
    pub fn can_unpublish(&self) -> bool {
        self.is_published && !self.is_cancelled && !self.has_registrations
    }

    #[must_use]
    pub fn can_cancel(&self) -> bool {
        self.is_published && !self.is_cancelled
    }

    #[must_use]
    pub fn can_delete(&self) -> bool {
        (!self.is_published || self.is_cancelled) && !self.has_registrations
    }

    /// Snapshot of the three action guards for display.
    #[must_use]
    pub fn guards(&self) -> ActionGuards {
        ActionGuards {
            can_unpublish: self.can_unpublish(),
            can_cancel: self.can_cancel(),
            can_delete: self.can_delete(),
        }
    }
}

/// Guard values at one point in time, for rendering action buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGuards {
    pub can_unpublish: bool,
    pub can_cancel: bool,
    pub can_delete: bool,
}
