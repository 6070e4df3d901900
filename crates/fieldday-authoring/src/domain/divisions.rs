//! Element-level diffing of the division collection.
//!
//! Divisions are matched by name. Renaming a division therefore reads as one
//! division removed and another added.

use std::collections::{HashMap, HashSet};

use fieldday_core::error::DomainError;
use serde_json::Value;

use super::change_log::{ChangeLog, ChangeLogEntry};
use super::diff::DiffStrategy;
use super::format::format_price;
use super::record::{PriceTierKind, PricedItem};

/// Raw side of a presence entry for a division that does not exist.
const ABSENT: &str = "null";

/// [`DiffStrategy`] for the division collection.
#[derive(Debug, Default, Clone, Copy)]
pub struct DivisionDiff;

impl DiffStrategy for DivisionDiff {
    fn diff(
        &self,
        log: &mut ChangeLog,
        field: &str,
        previous: &Value,
        next: &Value,
    ) -> Result<(), DomainError> {
        let previous = parse_divisions(field, previous)?;
        let next = parse_divisions(field, next)?;
        diff_divisions(log, &previous, &next);
        Ok(())
    }
}

fn parse_divisions(field: &str, value: &Value) -> Result<Vec<PricedItem>, DomainError> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value.clone())
        .map_err(|e| DomainError::Validation(format!("invalid {field}: {e}")))
}

/// Change-log key for one price tier of a division.
#[must_use]
pub fn tier_key(division: &str, tier: PriceTierKind) -> String {
    format!("{division}_{}", tier.key())
}

/// Change-log key recording that a division was added.
#[must_use]
pub fn added_key(division: &str) -> String {
    format!("{division}_added")
}

/// Change-log key recording that a division was removed.
#[must_use]
pub fn removed_key(division: &str) -> String {
    format!("{division}_removed")
}

/// Merges the differences between two division lists into `log`.
///
/// Emits one entry per changed price tier of a retained division, one per
/// added division and one per removed division. Removing a division that was
/// added in the same session, or re-adding one that was removed, cancels the
/// earlier presence entry instead of stacking a second one.
pub fn diff_divisions(log: &mut ChangeLog, previous: &[PricedItem], next: &[PricedItem]) {
    let previous_by_name = index_by_name(previous);
    let next_by_name = index_by_name(next);

    for (name, item) in unique_in_order(next, &next_by_name) {
        match previous_by_name.get(name) {
            Some(before) => {
                for tier in PriceTierKind::ALL {
                    if before.price(tier) != item.price(tier) {
                        log.upsert(tier_entry(name, tier, before.price(tier), item.price(tier)));
                    }
                }
                // Keep the "added @ $x" label current while the division
                // is still new.
                log.update_existing(&added_key(name), added_label(item), raw_item(item));
            }
            None => record_added(log, name, item),
        }
    }

    for (name, item) in unique_in_order(previous, &previous_by_name) {
        if !next_by_name.contains_key(name) {
            record_removed(log, name, item);
        }
    }

    log.prune_reverted();
}

fn record_added(log: &mut ChangeLog, name: &str, item: &PricedItem) {
    // A division removed earlier in the session carries the item as it was
    // at removal. Its tier entries, if still pending, hold the published
    // baseline and take precedence in the upsert below.
    let baseline = log
        .remove(&removed_key(name))
        .and_then(|removed| serde_json::from_str::<PricedItem>(&removed.raw_old).ok());

    for tier in PriceTierKind::ALL {
        let before = baseline.as_ref().and_then(|b| b.price(tier));
        log.upsert(tier_entry(name, tier, before, item.price(tier)));
    }

    if baseline.is_none() {
        log.upsert(ChangeLogEntry {
            field: added_key(name),
            field_name: format!("{name} division"),
            old_value: format_price(None),
            new_value: added_label(item),
            raw_old: ABSENT.to_owned(),
            raw_new: raw_item(item),
        });
    }
}

fn record_removed(log: &mut ChangeLog, name: &str, item: &PricedItem) {
    // Pending price edits on the division now read "not set"; an edit made
    // to a division added this session collapses back to nothing.
    for tier in PriceTierKind::ALL {
        log.update_existing(&tier_key(name, tier), format_price(None), raw_price(None));
    }

    if log.remove(&added_key(name)).is_some() {
        return;
    }

    log.upsert(ChangeLogEntry {
        field: removed_key(name),
        field_name: format!("{name} division"),
        old_value: "exists".to_owned(),
        new_value: "removed".to_owned(),
        raw_old: raw_item(item),
        raw_new: ABSENT.to_owned(),
    });
}

fn tier_entry(
    name: &str,
    tier: PriceTierKind,
    before: Option<f64>,
    after: Option<f64>,
) -> ChangeLogEntry {
    ChangeLogEntry {
        field: tier_key(name, tier),
        field_name: format!("{name} {} price", tier.key()),
        old_value: format_price(before),
        new_value: format_price(after),
        raw_old: raw_price(before),
        raw_new: raw_price(after),
    }
}

fn added_label(item: &PricedItem) -> String {
    match item.headline_price() {
        Some(price) => format!("added @ {}", format_price(Some(price))),
        None => "added".to_owned(),
    }
}

fn raw_price(price: Option<f64>) -> String {
    price.map_or_else(|| ABSENT.to_owned(), |p| Value::from(p).to_string())
}

fn raw_item(item: &PricedItem) -> String {
    serde_json::to_string(item).unwrap_or_else(|_| ABSENT.to_owned())
}

/// Name index; the last division with a given name wins.
fn index_by_name(items: &[PricedItem]) -> HashMap<&str, &PricedItem> {
    items.iter().map(|item| (item.name.as_str(), item)).collect()
}

/// Yields each distinct name once, in first-seen order, paired with the
/// indexed division for that name.
fn unique_in_order<'a>(
    items: &'a [PricedItem],
    index: &HashMap<&'a str, &'a PricedItem>,
) -> Vec<(&'a str, &'a PricedItem)> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(item.name.as_str()))
        .filter_map(|item| {
            index
                .get(item.name.as_str())
                .map(|indexed| (item.name.as_str(), *indexed))
        })
        .collect()
}
