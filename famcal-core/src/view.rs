//! Month grid and agenda views over a delivered event list.
//!
//! These never touch the store: views filter and bucket whatever the last
//! snapshot delivered.

use chrono::{Datelike, Days, Months, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

use crate::event::CalendarEvent;
use crate::household::Member;

/// A calendar month, used to navigate the grid and agenda.
///
/// Only months whose whole Monday-first grid lies inside the representable
/// date range can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthCursor {
    year: i32,
    month: u32,
    #[serde(skip)]
    first: NaiveDate,
    #[serde(skip)]
    last: NaiveDate,
    #[serde(skip)]
    grid_start: NaiveDate,
    #[serde(skip)]
    grid_end: NaiveDate,
}

impl MonthCursor {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let last = first
            .checked_add_months(Months::new(1))?
            .pred_opt()?;
        let grid_start =
            first.checked_sub_days(Days::new(first.weekday().num_days_from_monday() as u64))?;
        let grid_end =
            last.checked_add_days(Days::new(6 - last.weekday().num_days_from_monday() as u64))?;

        Some(MonthCursor {
            year,
            month,
            first,
            last,
            grid_start,
            grid_end,
        })
    }

    pub fn containing(date: NaiveDate) -> Option<Self> {
        MonthCursor::new(date.year(), date.month())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last
    }

    /// `None` past the end of the supported calendar.
    pub fn next(&self) -> Option<Self> {
        if self.month == 12 {
            MonthCursor::new(self.year.checked_add(1)?, 1)
        } else {
            MonthCursor::new(self.year, self.month + 1)
        }
    }

    /// `None` before the start of the supported calendar.
    pub fn prev(&self) -> Option<Self> {
        if self.month == 1 {
            MonthCursor::new(self.year.checked_sub(1)?, 12)
        } else {
            MonthCursor::new(self.year, self.month - 1)
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GridDay {
    pub date: NaiveDate,
    /// False for the leading/trailing days borrowed from adjacent months
    pub in_month: bool,
    pub events: Vec<CalendarEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthGrid {
    pub month: MonthCursor,
    /// Monday-first weeks covering the whole month
    pub weeks: Vec<Vec<GridDay>>,
}

impl MonthGrid {
    pub fn days(&self) -> impl Iterator<Item = &GridDay> {
        self.weeks.iter().flatten()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&GridDay> {
        self.days().find(|d| d.date == date)
    }
}

/// Keep only events assigned to `member`; `None` keeps everyone's.
pub fn filter_by_member(events: &[CalendarEvent], member: Option<Member>) -> Vec<CalendarEvent> {
    events
        .iter()
        .filter(|e| member.is_none_or(|m| e.assigned_to == m))
        .cloned()
        .collect()
}

fn local_start_date(event: &CalendarEvent, tz: Tz) -> NaiveDate {
    event.start_date.with_timezone(&tz).date_naive()
}

/// Lay the month out as full weeks and bucket events by their local start day.
pub fn month_grid(events: &[CalendarEvent], month: MonthCursor, tz: Tz) -> MonthGrid {
    let grid_end = month.grid_end;

    let days: Vec<GridDay> = month
        .grid_start
        .iter_days()
        .take_while(|d| *d <= grid_end)
        .map(|date| GridDay {
            date,
            in_month: month.contains(date),
            events: events
                .iter()
                .filter(|e| local_start_date(e, tz) == date)
                .cloned()
                .collect(),
        })
        .collect();

    MonthGrid {
        month,
        weeks: days.chunks(7).map(<[GridDay]>::to_vec).collect(),
    }
}

/// The month's events in start order.
pub fn agenda(events: &[CalendarEvent], month: MonthCursor, tz: Tz) -> Vec<CalendarEvent> {
    let mut entries: Vec<CalendarEvent> = events
        .iter()
        .filter(|e| month.contains(local_start_date(e, tz)))
        .cloned()
        .collect();
    entries.sort_by_key(|e| e.start_date);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Category;
    use chrono::{Duration, TimeZone, Utc};

    fn event(id: &str, member: Member, y: i32, m: u32, d: u32, h: u32) -> CalendarEvent {
        let start = Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap();
        CalendarEvent {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            start_date: start,
            end_date: start + Duration::hours(1),
            category: Category::Other,
            assigned_to: member,
            created_at: None,
        }
    }

    fn june() -> MonthCursor {
        MonthCursor::new(2024, 6).unwrap()
    }

    #[test]
    fn test_month_cursor_navigation() {
        let dec = MonthCursor::new(2024, 12).unwrap();
        assert_eq!(dec.next(), MonthCursor::new(2025, 1));
        assert_eq!(dec.next().and_then(|m| m.prev()), Some(dec));
        assert_eq!(dec.last_day(), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert!(MonthCursor::new(2024, 13).is_none());
    }

    #[test]
    fn test_month_cursor_rejects_grids_past_calendar_edges() {
        let last = NaiveDate::MAX;

        // The final month's grid would run past the last representable day
        assert!(MonthCursor::new(last.year(), last.month()).is_none());
        assert!(MonthCursor::containing(last).is_none());

        let november = MonthCursor::new(last.year(), 11).unwrap();
        assert!(november.next().is_none());
        assert_eq!(november.prev().map(|m| m.month()), Some(10));
    }

    #[test]
    fn test_grid_for_every_constructible_month_near_the_edge() {
        let year = NaiveDate::MAX.year();
        for month in 1..=12 {
            if let Some(cursor) = MonthCursor::new(year, month) {
                let grid = month_grid(&[], cursor, Tz::UTC);
                assert!(grid.weeks.iter().all(|w| w.len() == 7));
            }
        }
    }

    #[test]
    fn test_grid_covers_full_weeks_from_monday() {
        let grid = month_grid(&[], june(), Tz::UTC);

        // June 2024 starts on a Saturday and ends on a Sunday
        assert_eq!(grid.weeks.len(), 5);
        assert!(grid.weeks.iter().all(|w| w.len() == 7));
        assert_eq!(grid.weeks[0][0].date, NaiveDate::from_ymd_opt(2024, 5, 27).unwrap());
        assert!(!grid.weeks[0][0].in_month);
        assert_eq!(grid.weeks[4][6].date, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
        assert_eq!(grid.days().filter(|d| d.in_month).count(), 30);
    }

    #[test]
    fn test_grid_buckets_by_local_day() {
        let late = event("late", Member::Milo, 2024, 6, 1, 23);
        let grid = month_grid(&[late.clone()], june(), Tz::UTC);
        let june_1 = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(grid.day(june_1).unwrap().events, vec![late.clone()]);

        // 23:00 UTC is already the next day in Madrid
        let grid = month_grid(&[late.clone()], june(), chrono_tz::Europe::Madrid);
        assert!(grid.day(june_1).unwrap().events.is_empty());
        let june_2 = june_1.succ_opt().unwrap();
        assert_eq!(grid.day(june_2).unwrap().events, vec![late]);
    }

    #[test]
    fn test_filter_by_member() {
        let events = vec![
            event("a", Member::Milo, 2024, 6, 1, 9),
            event("b", Member::Maya, 2024, 6, 1, 10),
        ];
        assert_eq!(filter_by_member(&events, None).len(), 2);

        let milo = filter_by_member(&events, Some(Member::Milo));
        assert_eq!(milo.len(), 1);
        assert_eq!(milo[0].id, "a");
    }

    #[test]
    fn test_agenda_is_month_only_and_sorted() {
        let events = vec![
            event("later", Member::Liam, 2024, 6, 20, 9),
            event("july", Member::Liam, 2024, 7, 1, 9),
            event("sooner", Member::Liam, 2024, 6, 3, 9),
        ];
        let ids: Vec<String> = agenda(&events, june(), Tz::UTC)
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["sooner", "later"]);
    }
}
