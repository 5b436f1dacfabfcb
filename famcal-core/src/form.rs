//! The create / edit event form.
//!
//! Holds what the user typed and turns it into a `NewEvent` or an
//! `EventPatch` on submit.

use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FamCalError, FamCalResult};
use crate::event::{CalendarEvent, Category, EventPatch, NewEvent};
use crate::household::Member;

pub const DEFAULT_TITLE: &str = "New event";

/// Recurrence choice. Only one-off events are supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Repeat {
    #[default]
    Never,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventForm {
    #[serde(default)]
    pub title: String,
    /// Not stored separately; folded into the description on submit
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub assigned_to: Member,
    #[serde(default)]
    pub repeat: Repeat,
}

impl EventForm {
    /// An empty form starting at `now` (to the minute) and lasting an hour.
    pub fn blank(now: DateTime<Utc>) -> Self {
        let start = now
            .duration_trunc(Duration::minutes(1))
            .unwrap_or(now);

        EventForm {
            title: String::new(),
            location: String::new(),
            description: String::new(),
            start,
            end: start + Duration::hours(1),
            category: Category::default(),
            assigned_to: Member::default(),
            repeat: Repeat::Never,
        }
    }

    /// A form pre-filled with an existing event.
    pub fn edit(event: &CalendarEvent) -> Self {
        EventForm {
            title: event.title.clone(),
            location: String::new(),
            description: event.description.clone(),
            start: event.start_date,
            end: event.end_date,
            category: event.category,
            assigned_to: event.assigned_to,
            repeat: Repeat::Never,
        }
    }

    pub fn to_new_event(&self) -> FamCalResult<NewEvent> {
        if self.end < self.start {
            return Err(FamCalError::Validation(
                "the event ends before it starts".into(),
            ));
        }

        let title = if self.title.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            self.title.clone()
        };

        let description = match self.location.trim() {
            "" => self.description.clone(),
            location => format!("{}\n📍 {}", self.description, location)
                .trim()
                .to_string(),
        };

        Ok(NewEvent {
            title,
            description,
            start_date: self.start,
            end_date: self.end,
            category: self.category,
            assigned_to: self.assigned_to,
        })
    }

    /// Saving an edited event overwrites every editable field.
    pub fn to_patch(&self) -> FamCalResult<EventPatch> {
        self.to_new_event().map(EventPatch::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_blank_form_defaults() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 16, 7, 42).unwrap();
        let form = EventForm::blank(now);

        assert_eq!(form.start, Utc.with_ymd_and_hms(2024, 6, 1, 16, 7, 0).unwrap());
        assert_eq!(form.end, Utc.with_ymd_and_hms(2024, 6, 1, 17, 7, 0).unwrap());
        assert_eq!(form.category, Category::Other);
        assert_eq!(form.assigned_to, Member::Liam);
        assert_eq!(form.repeat, Repeat::Never);
    }

    #[test]
    fn test_empty_title_gets_default() {
        let form = EventForm::blank(Utc::now());
        assert_eq!(form.to_new_event().unwrap().title, DEFAULT_TITLE);
    }

    #[test]
    fn test_location_is_folded_into_description() {
        let mut form = EventForm::blank(Utc::now());
        form.location = "City pool".to_string();
        assert_eq!(form.to_new_event().unwrap().description, "📍 City pool");

        form.description = "Bring goggles".to_string();
        assert_eq!(
            form.to_new_event().unwrap().description,
            "Bring goggles\n📍 City pool"
        );
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let mut form = EventForm::blank(Utc::now());
        form.end = form.start - Duration::minutes(5);
        assert!(matches!(
            form.to_new_event(),
            Err(FamCalError::Validation(_))
        ));
    }

    #[test]
    fn test_edit_round_trips_through_patch() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 16, 0, 0).unwrap();
        let event = CalendarEvent {
            id: "evt".to_string(),
            title: "Dentist".to_string(),
            description: "Checkup".to_string(),
            start_date: start,
            end_date: start + Duration::minutes(30),
            category: Category::Medical,
            assigned_to: Member::Dani,
            created_at: Some(start),
        };

        let mut form = EventForm::edit(&event);
        form.assigned_to = Member::Maya;

        let patch = form.to_patch().unwrap();
        assert_eq!(patch.assigned_to, Some(Member::Maya));
        assert_eq!(patch.title.as_deref(), Some("Dentist"));
        assert_eq!(patch.description.as_deref(), Some("Checkup"));
        assert_eq!(patch.start_date, Some(start));
        assert_eq!(patch.category, Some(Category::Medical));
    }

    #[test]
    fn test_title_is_kept_as_typed() {
        let mut form = EventForm::blank(Utc::now());
        form.title = "  Swim ".to_string();
        assert_eq!(form.to_new_event().unwrap().title, "  Swim ");

        form.title.clear();
        form.location = "Pool".to_string();
        let patch = form.to_patch().unwrap();
        assert_eq!(patch.title.as_deref(), Some(DEFAULT_TITLE));
        assert_eq!(patch.description.as_deref(), Some("📍 Pool"));
    }
}
