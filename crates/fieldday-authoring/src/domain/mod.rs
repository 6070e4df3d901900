//! Domain model for the Event Authoring context.

pub mod change_log;
pub mod commands;
pub mod diff;
pub mod divisions;
pub mod format;
pub mod lifecycle;
pub mod record;
