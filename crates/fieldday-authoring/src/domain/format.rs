//! Human-readable rendering of field values for the change log.
//!
//! Formatted strings are shown to editors, but they also feed merge and
//! revert decisions indirectly: two different values must never format to
//! the same string, which is why long strings keep their length.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use super::record::{DIVISIONS_FIELD, PricedItem};

/// Strings longer than this are truncated.
const MAX_DISPLAY_CHARS: usize = 50;

/// Characters kept when truncating.
const TRUNCATED_CHARS: usize = 35;

/// Boolean fields rendered as "enabled"/"disabled" rather than "Yes"/"No".
const FEATURE_TOGGLE_FIELDS: &[&str] = &[
    "waitlistEnabled",
    "earlyBirdEnabled",
    "registrationEnabled",
    "paymentsEnabled",
];

/// Array fields with their own singular/plural nouns.
const COLLECTION_NOUNS: &[(&str, &str, &str)] = &[
    ("images", "photo", "photos"),
    ("documents", "document", "documents"),
];

/// Placeholder for missing values.
pub const EMPTY: &str = "empty";

/// Placeholder for a price tier with no price.
pub const NOT_SET: &str = "not set";

/// Renders `value` of `field` as a short display string.
#[must_use]
pub fn format_value(field: &str, value: &Value) -> String {
    match value {
        Value::Null => EMPTY.to_owned(),
        Value::String(s) if s.is_empty() => EMPTY.to_owned(),
        Value::Bool(b) => format_bool(field, *b),
        Value::String(s) if is_date_field(field) => {
            format_date(s).unwrap_or_else(|| truncate(s))
        }
        Value::Array(items) if field == DIVISIONS_FIELD => format_divisions_value(items),
        Value::Array(items) => format_count(field, items.len()),
        Value::Object(map) if map.contains_key("capacity") => format_capacity(&map["capacity"]),
        Value::String(s) => truncate(s),
        Value::Number(n) => n
            .as_f64()
            .filter(|_| n.is_f64())
            .map_or_else(|| n.to_string(), format_number),
        Value::Object(_) => value.to_string(),
    }
}

/// Renders a price as `$<amount>`, or [`NOT_SET`] when missing.
#[must_use]
pub fn format_price(price: Option<f64>) -> String {
    price.map_or_else(|| NOT_SET.to_owned(), |p| format!("${}", format_number(p)))
}

/// Summarizes a division collection.
#[must_use]
pub fn format_divisions(items: &[PricedItem]) -> String {
    match items {
        [] => "no divisions".to_owned(),
        [only] => match only.headline_price() {
            Some(price) => format!("{} @ {}", only.name, format_price(Some(price))),
            None => only.name.clone(),
        },
        many => {
            let prices: Vec<f64> = many.iter().flat_map(PricedItem::prices).collect();
            let min = prices.iter().copied().reduce(f64::min);
            let max = prices.iter().copied().reduce(f64::max);
            match (min, max) {
                (Some(min), Some(max)) => format!(
                    "{} divisions ({}-{})",
                    many.len(),
                    format_price(Some(min)),
                    format_price(Some(max))
                ),
                _ => format!("{} divisions", many.len()),
            }
        }
    }
}

fn format_divisions_value(items: &[Value]) -> String {
    match serde_json::from_value::<Vec<PricedItem>>(Value::Array(items.to_vec())) {
        Ok(divisions) => format_divisions(&divisions),
        Err(_) => format_count(DIVISIONS_FIELD, items.len()),
    }
}

fn format_bool(field: &str, value: bool) -> String {
    let label = match (FEATURE_TOGGLE_FIELDS.contains(&field), value) {
        (true, true) => "enabled",
        (true, false) => "disabled",
        (false, true) => "Yes",
        (false, false) => "No",
    };
    label.to_owned()
}

fn is_date_field(field: &str) -> bool {
    let lower = field.to_ascii_lowercase();
    lower.contains("date") || lower.contains("deadline") || lower == "registrationopens"
}

/// Parses an ISO date or RFC 3339 timestamp into `Mon D, YYYY`.
fn format_date(raw: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))?;
    Some(date.format("%b %-d, %Y").to_string())
}

fn format_count(field: &str, count: usize) -> String {
    let (singular, plural) = COLLECTION_NOUNS
        .iter()
        .find(|(name, _, _)| *name == field)
        .map_or(("item", "items"), |(_, s, p)| (*s, *p));
    let noun = if count == 1 { singular } else { plural };
    format!("{count} {noun}")
}

fn format_capacity(capacity: &Value) -> String {
    match capacity {
        Value::Number(n) if n.as_f64().is_some_and(|c| c != 0.0) => {
            format!("{} teams", format_value("capacity", capacity))
        }
        Value::String(s) if !s.is_empty() => format!("{s} teams"),
        _ => "Unlimited".to_owned(),
    }
}

/// Whole numbers print without a fractional part, like `100` not `100.0`.
#[allow(clippy::cast_possible_truncation)]
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn truncate(s: &str) -> String {
    let len = s.chars().count();
    if len <= MAX_DISPLAY_CHARS {
        return s.to_owned();
    }
    let head: String = s.chars().take(TRUNCATED_CHARS).collect();
    format!("{head}... ({len} chars)")
}
