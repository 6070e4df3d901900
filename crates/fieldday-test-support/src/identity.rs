//! Test identity helpers.

use fieldday_core::identity::EditorIdentity;

/// The editor used by tests that do not care who is editing.
#[must_use]
pub fn test_editor() -> EditorIdentity {
    EditorIdentity::new("user-1", "Casey Organizer")
}
