//! Application services for the Event Authoring context.

pub mod change_log_store;
pub mod command_handlers;
pub mod editor;
pub mod event_store;
pub mod query_handlers;
