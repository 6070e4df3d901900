//! Fieldday — Event Authoring bounded context.
//!
//! Responsible for the editing session of an event: the working draft,
//! the audit log of changes since the last publish, and the guarded
//! draft/publish/cancel/delete lifecycle.

pub mod application;
pub mod domain;
