//! Key-value store database schema.

/// SQL to create the key-value table. Mirrors the first migration.
pub const CREATE_KV_ENTRIES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS kv_entries (
    key         TEXT PRIMARY KEY,
    value       JSONB NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";
