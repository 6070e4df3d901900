//! Field-level diffing of record updates into the change log.
//!
//! Every tracked field is compared by its full JSON serialization, except
//! fields that have a registered [`DiffStrategy`] (the division collection),
//! which produce their own element-level entries.

use std::collections::HashMap;
use std::fmt;

use fieldday_core::error::DomainError;
use serde_json::{Map, Value};

use super::change_log::{ChangeLog, ChangeLogEntry};
use super::divisions::DivisionDiff;
use super::format::format_value;
use super::record::{DIVISIONS_FIELD, is_tracked};

/// Display labels for known fields. Unknown fields are humanized from their
/// camelCase name.
const FIELD_LABELS: &[(&str, &str)] = &[
    ("name", "Event Name"),
    ("description", "Description"),
    ("date", "Event Date"),
    ("endDate", "End Date"),
    ("location", "Location"),
    ("registrationOpens", "Registration Opens"),
    ("registrationDeadline", "Registration Deadline"),
    ("earlyBirdDeadline", "Early Bird Deadline"),
    ("slots", "Team Slots"),
    ("visibility", "Visibility"),
    ("waitlistEnabled", "Waitlist"),
    ("earlyBirdEnabled", "Early Bird Pricing"),
    ("requiresWaiver", "Waiver Required"),
    ("images", "Photos"),
    ("documents", "Documents"),
];

/// Diff behavior for a field that needs more than whole-value comparison.
pub trait DiffStrategy: Send + Sync + fmt::Debug {
    /// Merges the change from `previous` to `next` of `field` into `log`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if either value has the wrong shape.
    fn diff(
        &self,
        log: &mut ChangeLog,
        field: &str,
        previous: &Value,
        next: &Value,
    ) -> Result<(), DomainError>;
}

/// Whole-value comparison by serialized JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScalarDiff;

impl DiffStrategy for ScalarDiff {
    fn diff(
        &self,
        log: &mut ChangeLog,
        field: &str,
        previous: &Value,
        next: &Value,
    ) -> Result<(), DomainError> {
        let raw_old = previous.to_string();
        let raw_new = next.to_string();
        if raw_old == raw_new {
            return Ok(());
        }
        log.upsert(ChangeLogEntry {
            field: field.to_owned(),
            field_name: field_label(field),
            old_value: format_value(field, previous),
            new_value: format_value(field, next),
            raw_old,
            raw_new,
        });
        Ok(())
    }
}

/// Applies record updates to a change log.
#[derive(Debug)]
pub struct FieldDiffEngine {
    strategies: HashMap<String, Box<dyn DiffStrategy>>,
    fallback: ScalarDiff,
}

impl Default for FieldDiffEngine {
    fn default() -> Self {
        Self::new().with_strategy(DIVISIONS_FIELD, DivisionDiff)
    }
}

impl FieldDiffEngine {
    /// An engine with no special-cased fields.
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
            fallback: ScalarDiff,
        }
    }

    /// Registers `strategy` for `field`, replacing any previous one.
    #[must_use]
    pub fn with_strategy(mut self, field: &str, strategy: impl DiffStrategy + 'static) -> Self {
        self.strategies.insert(field.to_owned(), Box::new(strategy));
        self
    }

    fn strategy_for(&self, field: &str) -> &dyn DiffStrategy {
        self.strategies
            .get(field)
            .map_or(&self.fallback as &dyn DiffStrategy, |strategy| strategy.as_ref())
    }

    /// Merges `updates` into `log`.
    ///
    /// `previous` must be the in-memory draft before this update, not the
    /// published snapshot: new entries take their old side from it, while
    /// existing entries keep the old side they were created with. Entries
    /// whose change has been undone are dropped afterwards.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a strategy rejects a value. The
    /// log may then hold part of the update; callers wanting atomicity apply
    /// to a copy.
    pub fn apply_update(
        &self,
        log: &mut ChangeLog,
        previous: &Map<String, Value>,
        updates: &Map<String, Value>,
    ) -> Result<(), DomainError> {
        for (field, next) in updates {
            if !is_tracked(field) {
                continue;
            }
            let before = previous.get(field).unwrap_or(&Value::Null);
            self.strategy_for(field).diff(log, field, before, next)?;
        }
        log.prune_reverted();
        Ok(())
    }

    /// Builds a log from scratch by comparing every tracked field of a
    /// published snapshot against a draft.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a strategy rejects a value.
    pub fn compare(
        &self,
        published: &Map<String, Value>,
        draft: &Map<String, Value>,
    ) -> Result<ChangeLog, DomainError> {
        let mut updates: Map<String, Value> = draft.clone();
        for field in published.keys() {
            updates.entry(field.clone()).or_insert(Value::Null);
        }
        let mut log = ChangeLog::new();
        self.apply_update(&mut log, published, &updates)?;
        Ok(log)
    }

    /// Re-derives the new side of whole-value entries from `current`, then
    /// drops entries that no longer change anything. Returns `true` if the
    /// log was modified.
    ///
    /// Entries produced by a strategy are keyed by element, not by field,
    /// and are left alone.
    pub fn reconcile(&self, log: &mut ChangeLog, current: &Map<String, Value>) -> bool {
        let before = log.clone();
        for (field, value) in current {
            if !is_tracked(field) || self.strategies.contains_key(field) {
                continue;
            }
            let raw_new = value.to_string();
            if log.get(field).is_some_and(|entry| entry.raw_new != raw_new) {
                log.update_existing(field, format_value(field, value), raw_new);
            }
        }
        log.prune_reverted();
        *log != before
    }
}

/// Returns the display label for `field`.
#[must_use]
pub fn field_label(field: &str) -> String {
    FIELD_LABELS
        .iter()
        .find(|(key, _)| *key == field)
        .map_or_else(|| humanize(field), |(_, label)| (*label).to_owned())
}

/// `earlyBirdDeadline` -> `Early Bird Deadline`.
fn humanize(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    for (i, ch) in field.chars().enumerate() {
        if i == 0 {
            out.extend(ch.to_uppercase());
        } else if ch.is_uppercase() {
            out.push(' ');
            out.push(ch);
        } else if ch == '_' {
            out.push(' ');
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn test_new_entry_uses_current_value_as_old_side() {
        // Arrange
        let engine = FieldDiffEngine::default();
        let mut log = ChangeLog::new();
        let previous = map(json!({ "location": "Arena", "name": "Cup" }));

        // Act
        engine
            .apply_update(&mut log, &previous, &map(json!({ "location": "Dome" })))
            .unwrap();

        // Assert
        assert_eq!(log.len(), 1);
        let entry = log.get("location").unwrap();
        assert_eq!(entry.field_name, "Location");
        assert_eq!(entry.old_value, "Arena");
        assert_eq!(entry.new_value, "Dome");
        assert_eq!(entry.raw_old, "\"Arena\"");
        assert_eq!(entry.raw_new, "\"Dome\"");
    }

    #[test]
    fn test_merge_law_keeps_original_old_side() {
        let engine = FieldDiffEngine::default();
        let mut log = ChangeLog::new();

        engine
            .apply_update(
                &mut log,
                &map(json!({ "date": "2026-04-01" })),
                &map(json!({ "date": "2026-04-08" })),
            )
            .unwrap();
        engine
            .apply_update(
                &mut log,
                &map(json!({ "date": "2026-04-08" })),
                &map(json!({ "date": "2026-04-15" })),
            )
            .unwrap();

        assert_eq!(log.len(), 1);
        let entry = log.get("date").unwrap();
        assert_eq!(entry.old_value, "Apr 1, 2026");
        assert_eq!(entry.new_value, "Apr 15, 2026");
    }

    #[test]
    fn test_revert_in_multi_field_update_drops_only_reverted_entry() {
        // Arrange
        let engine = FieldDiffEngine::default();
        let mut log = ChangeLog::new();
        engine
            .apply_update(
                &mut log,
                &map(json!({ "location": "Arena", "name": "Cup" })),
                &map(json!({ "location": "Dome", "name": "Spring Cup" })),
            )
            .unwrap();

        // Act
        engine
            .apply_update(
                &mut log,
                &map(json!({ "location": "Dome", "name": "Spring Cup" })),
                &map(json!({ "location": "Arena", "name": "Spring Cup!" })),
            )
            .unwrap();

        // Assert
        assert_eq!(log.len(), 1);
        assert!(log.get("location").is_none());
        assert_eq!(log.get("name").unwrap().old_value, "Cup");
        assert_eq!(log.get("name").unwrap().new_value, "Spring Cup!");
    }

    #[test]
    fn test_divisions_are_delegated_without_top_level_entry() {
        let engine = FieldDiffEngine::default();
        let mut log = ChangeLog::new();

        engine
            .apply_update(
                &mut log,
                &map(json!({ "availableDivisions": [{ "name": "U12", "regular": { "price": 100 } }] })),
                &map(json!({ "availableDivisions": [{ "name": "U12", "regular": { "price": 120 } }] })),
            )
            .unwrap();

        assert!(log.get("availableDivisions").is_none());
        let entry = log.get("U12_regular").unwrap();
        assert_eq!(entry.old_value, "$100");
        assert_eq!(entry.new_value, "$120");
    }

    #[test]
    fn test_engine_without_strategy_treats_divisions_as_opaque() {
        let engine = FieldDiffEngine::new();
        let mut log = ChangeLog::new();

        engine
            .apply_update(
                &mut log,
                &map(json!({ "availableDivisions": [] })),
                &map(json!({ "availableDivisions": [{ "name": "U12" }] })),
            )
            .unwrap();

        let entry = log.get("availableDivisions").unwrap();
        assert_eq!(entry.old_value, "no divisions");
        assert_eq!(entry.new_value, "U12");
    }

    #[test]
    fn test_untracked_fields_are_ignored() {
        let engine = FieldDiffEngine::default();
        let mut log = ChangeLog::new();

        engine
            .apply_update(
                &mut log,
                &map(json!({ "status": "draft", "updatedAt": null })),
                &map(json!({ "status": "published", "updatedAt": "2026-01-15T10:00:00Z" })),
            )
            .unwrap();

        assert!(log.is_empty());
    }

    #[test]
    fn test_idempotent_update_adds_nothing_the_second_time() {
        let engine = FieldDiffEngine::default();
        let mut log = ChangeLog::new();
        let before = map(json!({ "capacity": 40 }));
        let after = map(json!({ "capacity": 50 }));

        engine.apply_update(&mut log, &before, &after).unwrap();
        let once = log.clone();
        engine.apply_update(&mut log, &after, &after).unwrap();

        assert_eq!(log, once);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_compare_seeds_log_from_published_and_draft() {
        // Arrange
        let engine = FieldDiffEngine::default();
        let published = map(json!({
            "id": "event-1",
            "name": "Cup",
            "location": "Arena",
            "availableDivisions": [{ "name": "U12", "regular": { "price": 100 } }],
            "images": []
        }));
        let draft = map(json!({
            "id": "event-1",
            "name": "Cup",
            "location": "Dome",
            "availableDivisions": [],
            "images": ["a.png", "b.png"]
        }));

        // Act
        let log = engine.compare(&published, &draft).unwrap();

        // Assert
        let mut keys: Vec<&str> = log.entries().iter().map(|e| e.field.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["U12_removed", "images", "location"]);
        assert_eq!(log.get("images").unwrap().new_value, "2 photos");
    }

    #[test]
    fn test_reconcile_drops_entry_whose_value_was_restored() {
        // Arrange
        let engine = FieldDiffEngine::default();
        let mut log = ChangeLog::new();
        engine
            .apply_update(
                &mut log,
                &map(json!({ "location": "Arena", "name": "Cup" })),
                &map(json!({ "location": "", "name": "Spring Cup" })),
            )
            .unwrap();

        // Act
        let changed = engine.reconcile(
            &mut log,
            &map(json!({ "location": "Arena", "name": "Spring Cup" })),
        );

        // Assert
        assert!(changed);
        assert!(log.get("location").is_none());
        assert_eq!(log.get("name").unwrap().new_value, "Spring Cup");
    }

    #[test]
    fn test_reconcile_updates_stale_new_side() {
        let engine = FieldDiffEngine::default();
        let mut log = ChangeLog::new();
        engine
            .apply_update(
                &mut log,
                &map(json!({ "location": "Arena" })),
                &map(json!({ "location": "Dome" })),
            )
            .unwrap();

        let changed = engine.reconcile(&mut log, &map(json!({ "location": "Stadium" })));

        assert!(changed);
        let entry = log.get("location").unwrap();
        assert_eq!(entry.old_value, "Arena");
        assert_eq!(entry.new_value, "Stadium");
        assert_eq!(entry.raw_new, "\"Stadium\"");
    }

    #[test]
    fn test_reconcile_leaves_division_entries_and_current_log_alone() {
        let engine = FieldDiffEngine::default();
        let mut log = ChangeLog::new();
        engine
            .apply_update(
                &mut log,
                &map(json!({
                    "location": "Arena",
                    "availableDivisions": [{ "name": "U12", "regular": { "price": 100 } }]
                })),
                &map(json!({
                    "location": "Dome",
                    "availableDivisions": [{ "name": "U12", "regular": { "price": 120 } }]
                })),
            )
            .unwrap();
        let before = log.clone();

        let changed = engine.reconcile(
            &mut log,
            &map(json!({
                "location": "Dome",
                "availableDivisions": [{ "name": "U12", "regular": { "price": 120 } }]
            })),
        );

        assert!(!changed);
        assert_eq!(log, before);
    }

    #[test]
    fn test_field_label_humanizes_unknown_fields() {
        assert_eq!(field_label("registrationDeadline"), "Registration Deadline");
        assert_eq!(field_label("refundPolicyUrl"), "Refund Policy Url");
        assert_eq!(field_label("capacity"), "Capacity");
    }
}
