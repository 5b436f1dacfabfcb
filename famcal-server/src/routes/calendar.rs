//! Month grid and agenda endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use famcal_core::view::{self, MonthCursor, MonthGrid, filter_by_member};
use famcal_core::{CalendarEvent, FamCalError};

use crate::routes::{AppError, MemberFilter};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/calendar/{year}/{month}", get(month_grid))
        .route("/agenda/{year}/{month}", get(agenda))
}

fn cursor(year: i32, month: u32) -> Result<MonthCursor, AppError> {
    MonthCursor::new(year, month)
        .ok_or_else(|| FamCalError::Validation(format!("Invalid month {}-{}", year, month)).into())
}

fn member_events(state: &AppState, filter: &MemberFilter) -> Vec<CalendarEvent> {
    filter_by_member(&state.live.events(), filter.member)
}

/// GET /calendar/:year/:month - Month grid with events bucketed by day
async fn month_grid(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    Query(filter): Query<MemberFilter>,
) -> Result<Json<MonthGrid>, AppError> {
    let month = cursor(year, month)?;
    let events = member_events(&state, &filter);

    Ok(Json(view::month_grid(&events, month, state.tz)))
}

/// GET /agenda/:year/:month - The month's events in start order
async fn agenda(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    Query(filter): Query<MemberFilter>,
) -> Result<Json<Vec<CalendarEvent>>, AppError> {
    let month = cursor(year, month)?;
    let events = member_events(&state, &filter);

    Ok(Json(view::agenda(&events, month, state.tz)))
}
