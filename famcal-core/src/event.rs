//! Family calendar event types.
//!
//! `CalendarEvent` is what subscribers see. Writes go through `NewEvent`
//! (creation) and `EventPatch` (partial update); neither carries an `id` or a
//! `created_at`, so those two fields are only ever set by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::household::Member;

/// An event as delivered by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub category: Category,
    pub assigned_to: Member,
    /// Missing on records written before creation stamping existed.
    pub created_at: Option<DateTime<Utc>>,
}

/// An event that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub category: Category,
    pub assigned_to: Member,
}

/// A partial update. Fields left as `None` are untouched by the store.
///
/// Deserializing drops any `id` or `createdAt` a caller sends along; there is
/// nowhere to put them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Member>,
}

impl From<NewEvent> for EventPatch {
    fn from(event: NewEvent) -> Self {
        EventPatch {
            title: Some(event.title),
            description: Some(event.description),
            start_date: Some(event.start_date),
            end_date: Some(event.end_date),
            category: Some(event.category),
            assigned_to: Some(event.assigned_to),
        }
    }
}

/// Activity category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Sport,
    Medical,
    School,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Sport,
        Category::Medical,
        Category::School,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sport => "Sport",
            Category::Medical => "Medical",
            Category::School => "School",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Also accepts the Spanish names older records were written with.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Deporte" => Ok(Category::Sport),
            "Médico" => Ok(Category::Medical),
            "Escuela" => Ok(Category::School),
            "Otro" => Ok(Category::Other),
            _ => Category::ALL
                .into_iter()
                .find(|c| c.as_str() == s)
                .ok_or_else(|| format!("Unknown category '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_ignores_id_and_created_at() {
        let json = r#"{"assignedTo": "Maya", "id": "other", "createdAt": "2020-01-01T00:00:00Z"}"#;
        let patch: EventPatch = serde_json::from_str(json).unwrap();

        assert_eq!(
            patch,
            EventPatch {
                assigned_to: Some(Member::Maya),
                ..Default::default()
            }
        );
        let back = serde_json::to_value(&patch).unwrap();
        assert_eq!(back, serde_json::json!({ "assignedTo": "Maya" }));
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("Medical".parse::<Category>(), Ok(Category::Medical));
        assert_eq!("Deporte".parse::<Category>(), Ok(Category::Sport));
        assert!("Gardening".parse::<Category>().is_err());
    }
}
