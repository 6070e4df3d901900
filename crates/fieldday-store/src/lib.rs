//! Storage backends for the `KeyValueStore` port.

pub mod memory_key_value_store;
pub mod pg_key_value_store;
pub mod schema;
