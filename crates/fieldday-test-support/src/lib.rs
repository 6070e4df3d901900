//! Shared test mocks and utilities for the Fieldday event platform.

mod clock;
mod identity;
mod store;

pub use clock::FixedClock;
pub use identity::test_editor;
pub use store::{FailingKeyValueStore, RecordingKeyValueStore, StoreOp};
