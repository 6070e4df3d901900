//! The audit log of pending changes since the last publish.

use serde::{Deserialize, Serialize};

/// One pending change, shown as `field_name: old_value -> new_value`.
///
/// `raw_old`/`raw_new` are serialized values used only to decide merges and
/// reverts; they are never displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogEntry {
    /// Stable key: a field name, or `<division>_<tier|added|removed>`.
    pub field: String,
    /// Human-readable label.
    pub field_name: String,
    /// Formatted value at the last publish.
    pub old_value: String,
    /// Formatted current value.
    pub new_value: String,
    /// Serialized value at the last publish.
    pub raw_old: String,
    /// Serialized current value.
    pub raw_new: String,
}

impl ChangeLogEntry {
    /// `true` when the change has been undone.
    #[must_use]
    pub fn is_reverted(&self) -> bool {
        self.raw_old == self.raw_new
    }
}

/// Ordered pending changes with at most one entry per key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeLog {
    entries: Vec<ChangeLogEntry>,
}

impl ChangeLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a log from persisted entries, collapsing duplicate keys onto
    /// the first occurrence and dropping reverted entries.
    #[must_use]
    pub fn from_entries(entries: Vec<ChangeLogEntry>) -> Self {
        let mut log = Self::new();
        for entry in entries {
            log.upsert(entry);
        }
        log.prune_reverted();
        log
    }

    /// The entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[ChangeLogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the entry for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&ChangeLogEntry> {
        self.entries.iter().find(|e| e.field == field)
    }

    /// Merge-or-append. An existing entry for the same key keeps its original
    /// old side and takes the new side of `entry`; otherwise `entry` is
    /// appended unless it is already a no-op.
    pub fn upsert(&mut self, entry: ChangeLogEntry) {
        if self.update_existing(&entry.field, entry.new_value.clone(), entry.raw_new.clone()) {
            return;
        }
        if !entry.is_reverted() {
            self.entries.push(entry);
        }
    }

    /// Updates the new side of an existing entry only. Returns `false` when
    /// there is no entry for `field`.
    pub fn update_existing(&mut self, field: &str, new_value: String, raw_new: String) -> bool {
        match self.entries.iter_mut().find(|e| e.field == field) {
            Some(existing) => {
                existing.new_value = new_value;
                existing.raw_new = raw_new;
                true
            }
            None => false,
        }
    }

    /// Removes and returns the entry for `field`.
    pub fn remove(&mut self, field: &str) -> Option<ChangeLogEntry> {
        let index = self.entries.iter().position(|e| e.field == field)?;
        Some(self.entries.remove(index))
    }

    /// Drops every entry whose change has been undone.
    pub fn prune_reverted(&mut self) {
        self.entries.retain(|e| !e.is_reverted());
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<ChangeLogEntry> {
        self.entries
    }
}
