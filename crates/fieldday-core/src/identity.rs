//! Editor identity supplied by the session layer.

use serde::{Deserialize, Serialize};

/// The person currently editing a record.
///
/// Only used to stamp authorship on publish; it carries no permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorIdentity {
    /// Stable user identifier.
    pub user_id: String,
    /// Name shown as the organizer of published records.
    pub display_name: String,
}

impl EditorIdentity {
    /// Creates a new identity.
    #[must_use]
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }
}
