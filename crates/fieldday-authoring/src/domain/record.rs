//! The event record being authored and its nested value types.

use chrono::{DateTime, Utc};
use fieldday_core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Field holding the priced division collection.
pub const DIVISIONS_FIELD: &str = "availableDivisions";

/// Bookkeeping fields that are stamped by the lifecycle, never edited
/// directly and never audited.
pub const UNTRACKED_FIELDS: &[&str] = &[
    "id",
    "status",
    "createdAt",
    "updatedAt",
    "publishedAt",
    "cancelledAt",
    "organizer",
    "organizerId",
];

/// Fields that must be non-blank before a record can be published.
pub const REQUIRED_FIELDS: &[&str] = &["name", "description", "date", "location"];

/// Returns `true` if `field` participates in change auditing.
#[must_use]
pub fn is_tracked(field: &str) -> bool {
    !UNTRACKED_FIELDS.contains(&field)
}

/// Returns `true` for values treated as "not filled in": null and the empty
/// string.
#[must_use]
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Persisted lifecycle status. "Cancelled" is not a status of its own; it is
/// a draft that remembers a prior publication through `cancelled_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Not visible to registrants.
    #[default]
    Draft,
    /// Live and accepting registrations.
    Published,
}

/// Who can discover the event once published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Listed in the public catalog.
    #[default]
    Public,
    /// Reachable by direct link only.
    Unlisted,
    /// Invitation only.
    Private,
}

/// Team capacity and the number of registrations taken.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slots {
    /// Maximum number of teams; `None` or zero means unlimited.
    #[serde(default)]
    pub capacity: Option<u32>,
    /// Teams registered so far.
    #[serde(default)]
    pub filled: u32,
}

/// One price tier of a division.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceTier {
    /// Price in dollars, if set.
    #[serde(default)]
    pub price: Option<f64>,
}

/// The price tiers tracked for every division.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceTierKind {
    /// The standard registration price.
    Regular,
    /// The discounted price before the early-bird deadline.
    Early,
}

impl PriceTierKind {
    /// Every tracked tier, in audit order.
    pub const ALL: [Self; 2] = [Self::Regular, Self::Early];

    /// The key used for this tier in records and change-log keys.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Early => "early",
        }
    }
}

/// A division offered by an event. The name is its identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricedItem {
    /// Division name, e.g. `"U12"`.
    pub name: String,
    /// Regular price tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular: Option<PriceTier>,
    /// Early-bird price tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub early: Option<PriceTier>,
}

impl PricedItem {
    /// Returns the price set for `tier`, if any.
    #[must_use]
    pub fn price(&self, tier: PriceTierKind) -> Option<f64> {
        let tier = match tier {
            PriceTierKind::Regular => self.regular.as_ref(),
            PriceTierKind::Early => self.early.as_ref(),
        };
        tier.and_then(|t| t.price)
    }

    /// The price shown when a single figure is needed: regular, else early.
    #[must_use]
    pub fn headline_price(&self) -> Option<f64> {
        self.price(PriceTierKind::Regular)
            .or_else(|| self.price(PriceTierKind::Early))
    }

    /// All prices set on this division.
    pub fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        PriceTierKind::ALL.into_iter().filter_map(|t| self.price(t))
    }
}

/// The working copy of an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Record identifier, e.g. `"event-1768471200000"`.
    pub id: String,
    /// Event title.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// ISO date of the first day.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(default)]
    pub registration_opens: Option<String>,
    #[serde(default)]
    pub registration_deadline: Option<String>,
    #[serde(default)]
    pub early_bird_deadline: Option<String>,
    #[serde(default)]
    pub slots: Slots,
    /// Divisions with their price tiers.
    #[serde(default)]
    pub available_divisions: Vec<PricedItem>,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub waitlist_enabled: bool,
    #[serde(default)]
    pub early_bird_enabled: bool,
    #[serde(default)]
    pub requires_waiver: bool,
    /// Gallery image URLs.
    #[serde(default)]
    pub images: Vec<String>,
    /// Attached document URLs (rules, waivers).
    #[serde(default)]
    pub documents: Vec<String>,
    /// Display name of the editor who last published.
    #[serde(default)]
    pub organizer: Option<String>,
    #[serde(default)]
    pub organizer_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Set when a published event is cancelled; cleared on republish.
    #[serde(default)]
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Fields this model does not name explicitly are carried through as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reads a text field, treating null as cleared.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl EventRecord {
    /// A blank draft for the create flow.
    #[must_use]
    pub fn template(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at: Some(now),
            updated_at: Some(now),
            ..Self::default()
        }
    }

    /// Serializes the record into its field map.
    ///
    /// # Panics
    ///
    /// Panics only if the derived `Serialize` impl fails, which it cannot
    /// for string-keyed maps.
    #[must_use]
    pub fn to_fields(&self) -> Map<String, Value> {
        // Serialization of a derived Serialize struct to Value is infallible.
        match serde_json::to_value(self).expect("EventRecord serialization is infallible") {
            Value::Object(fields) => fields,
            _ => Map::new(),
        }
    }

    /// Rebuilds a record from a field map.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a field has the wrong shape.
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, DomainError> {
        serde_json::from_value(Value::Object(fields))
            .map_err(|e| DomainError::Validation(format!("invalid event record: {e}")))
    }

    /// Returns a copy with `updates` applied. Bookkeeping fields in `updates`
    /// are ignored so the lifecycle stays in control of them.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if an update has the wrong shape.
    pub fn with_updates(&self, updates: &Map<String, Value>) -> Result<Self, DomainError> {
        let mut fields = self.to_fields();
        for (field, value) in updates {
            if is_tracked(field) {
                fields.insert(field.clone(), value.clone());
            }
        }
        let mut next = Self::from_fields(fields)?;
        // Registrations are not editable; a partial slots update keeps them.
        next.slots.filled = self.slots.filled;
        Ok(next)
    }

    /// Overlays the non-blank fields of a stored draft onto the published
    /// snapshot, so an abandoned half-filled draft cannot blank out fields.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the merged map is not a record.
    pub fn merge_draft(published: &Self, draft: &Self) -> Result<Self, DomainError> {
        let mut fields = published.to_fields();
        for (field, value) in draft.to_fields() {
            if !is_blank(&value) {
                fields.insert(field, value);
            }
        }
        let mut merged = Self::from_fields(fields)?;
        // Registrations accrue on the live record, never on a draft.
        merged.slots.filled = published.slots.filled;
        Ok(merged)
    }

    /// Names of required fields that are still blank.
    #[must_use]
    pub fn missing_required_fields(&self) -> Vec<String> {
        let fields = self.to_fields();
        REQUIRED_FIELDS
            .iter()
            .filter(|f| fields.get(**f).is_none_or(is_blank))
            .map(|f| (*f).to_owned())
            .collect()
    }

    /// `true` once at least one team has registered.
    #[must_use]
    pub fn has_registrations(&self) -> bool {
        self.slots.filled > 0
    }
}
