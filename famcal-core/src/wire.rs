//! Store-native representation of events.
//!
//! Everything that knows how the document store spells a timestamp or a
//! field name lives here. `to_wire` / `from_wire` are the only timestamp
//! conversions; swapping the store technology means rewriting this module
//! and nothing above it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::event::{CalendarEvent, Category, EventPatch, NewEvent};
use crate::household::Member;

pub const EVENTS_COLLECTION: &str = "events";

pub const TITLE: &str = "title";
pub const DESCRIPTION: &str = "description";
pub const CATEGORY: &str = "category";
pub const ASSIGNED_TO: &str = "assignedTo";
pub const START_DATE: &str = "startDate";
pub const END_DATE: &str = "endDate";
pub const CREATED_AT: &str = "createdAt";

/// Store-native timestamp: seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WireTimestamp {
    pub seconds: i64,
    pub nanos: i32,
}

/// A single field value as the store holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Timestamp(WireTimestamp),
    String(String),
    /// Write-only sentinel; the store substitutes its own clock at commit.
    ServerTimestamp,
}

/// The fields of one document.
pub type Fields = BTreeMap<String, FieldValue>;

pub fn to_wire(dt: DateTime<Utc>) -> WireTimestamp {
    WireTimestamp {
        seconds: dt.timestamp(),
        nanos: dt.timestamp_subsec_nanos() as i32,
    }
}

/// Returns `None` for timestamps chrono cannot represent.
pub fn from_wire(ts: &WireTimestamp) -> Option<DateTime<Utc>> {
    let nanos = u32::try_from(ts.nanos).ok()?;
    DateTime::from_timestamp(ts.seconds, nanos)
}

impl FieldValue {
    fn type_rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Bool(_) => 1,
            FieldValue::Integer(_) => 2,
            FieldValue::Timestamp(_) => 3,
            FieldValue::String(_) => 4,
            FieldValue::ServerTimestamp => 5,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(ts) => from_wire(ts),
            _ => None,
        }
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(dt: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(to_wire(dt))
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

/// Values of different types order by type first (null lowest), then by value.
impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a.cmp(b),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a.cmp(b),
            (FieldValue::String(a), FieldValue::String(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Fields for a brand new document. `createdAt` is left for the store to stamp.
pub fn encode_new(event: &NewEvent) -> Fields {
    let mut fields = encode_patch(&EventPatch::from(event.clone()));
    fields.insert(CREATED_AT.to_string(), FieldValue::ServerTimestamp);
    fields
}

/// Only the fields present in the patch are sent.
pub fn encode_patch(patch: &EventPatch) -> Fields {
    let mut fields = Fields::new();
    if let Some(title) = &patch.title {
        fields.insert(TITLE.to_string(), title.as_str().into());
    }
    if let Some(description) = &patch.description {
        fields.insert(DESCRIPTION.to_string(), description.as_str().into());
    }
    if let Some(category) = patch.category {
        fields.insert(CATEGORY.to_string(), category.as_str().into());
    }
    if let Some(member) = patch.assigned_to {
        fields.insert(ASSIGNED_TO.to_string(), member.name().into());
    }
    if let Some(start) = patch.start_date {
        fields.insert(START_DATE.to_string(), start.into());
    }
    if let Some(end) = patch.end_date {
        fields.insert(END_DATE.to_string(), end.into());
    }
    fields
}

/// Decode a stored document, substituting the current time for missing dates.
pub fn decode(id: &str, fields: &Fields) -> CalendarEvent {
    decode_at(id, fields, Utc::now())
}

/// Like [`decode`] with an explicit fallback time.
///
/// Every record decodes. A member outside the roster is shown as the
/// household's default member so the event stays visible and editable.
pub fn decode_at(id: &str, fields: &Fields, now: DateTime<Utc>) -> CalendarEvent {
    let text = |name: &str| {
        fields
            .get(name)
            .and_then(FieldValue::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let date = |name: &str| {
        fields
            .get(name)
            .and_then(FieldValue::as_timestamp)
            .unwrap_or_else(|| {
                tracing::warn!(id, field = name, "Event is missing a timestamp, using current time");
                now
            })
    };

    let assigned_to = match fields.get(ASSIGNED_TO).and_then(FieldValue::as_str) {
        Some(name) => name.parse::<Member>().unwrap_or_else(|e| {
            tracing::warn!(id, "{}, showing it as {}", e, Member::default());
            Member::default()
        }),
        None => {
            tracing::warn!(id, "Event has no assigned member, showing it as {}", Member::default());
            Member::default()
        }
    };

    let category = fields
        .get(CATEGORY)
        .and_then(FieldValue::as_str)
        .and_then(|s| s.parse::<Category>().ok())
        .unwrap_or_default();

    CalendarEvent {
        id: id.to_string(),
        title: text(TITLE),
        description: text(DESCRIPTION),
        start_date: date(START_DATE),
        end_date: date(END_DATE),
        category,
        assigned_to,
        created_at: fields.get(CREATED_AT).and_then(FieldValue::as_timestamp),
    }
}
