//! Shared application state.

use std::sync::Arc;

use fieldday_authoring::application::event_store::EventStore;
use fieldday_core::clock::Clock;
use fieldday_core::identity::EditorIdentity;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock used to stamp records and mint new ids.
    pub clock: Arc<dyn Clock>,
    /// Drafts, published snapshots and change logs.
    pub event_store: Arc<dyn EventStore>,
    /// Identity used when a request names no editor.
    pub default_editor: EditorIdentity,
    /// Name of the key-value backend, reported by the health check.
    pub storage_backend: &'static str,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("default_editor", &self.default_editor)
            .field("storage_backend", &self.storage_backend)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        event_store: Arc<dyn EventStore>,
        default_editor: EditorIdentity,
        storage_backend: &'static str,
    ) -> Self {
        Self {
            clock,
            event_store,
            default_editor,
            storage_backend,
        }
    }
}
