//! Event endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
};
use famcal_core::form::EventForm;
use famcal_core::view::filter_by_member;
use famcal_core::wire::EVENTS_COLLECTION;
use famcal_core::{CalendarEvent, EventPatch, FamCalError};
use serde::Serialize;

use crate::routes::{AppError, MemberFilter};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/{id}",
            patch(update_event).put(save_event).delete(delete_event),
        )
        .route("/events/{id}/form", get(edit_form))
}

/// Current events as last delivered by the store
#[derive(Serialize)]
pub struct EventsResponse {
    pub events: Vec<CalendarEvent>,
    pub loading: bool,
    pub stale: bool,
}

#[derive(Serialize)]
pub struct CreatedEvent {
    pub id: String,
}

/// GET /events - List events, optionally for one member
async fn list_events(
    State(state): State<AppState>,
    Query(filter): Query<MemberFilter>,
) -> Json<EventsResponse> {
    let snapshot = state.live.snapshot();

    Json(EventsResponse {
        events: filter_by_member(&snapshot.events, filter.member),
        loading: snapshot.loading,
        stale: snapshot.stale,
    })
}

/// POST /events - Create an event from the form
async fn create_event(
    State(state): State<AppState>,
    Json(form): Json<EventForm>,
) -> Result<(StatusCode, Json<CreatedEvent>), AppError> {
    let event = form.to_new_event()?;
    let id = state.remote.create_event(&event).await?;

    Ok((StatusCode::CREATED, Json(CreatedEvent { id })))
}

/// PATCH /events/:id - Change some fields of an event
async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<EventPatch>,
) -> Result<StatusCode, AppError> {
    state.remote.update_event(&id, &patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /events/:id/form - The edit form pre-filled with an event
async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventForm>, AppError> {
    let events = state.live.events();
    let event = events
        .iter()
        .find(|e| e.id == id)
        .ok_or_else(|| FamCalError::NotFound {
            collection: EVENTS_COLLECTION.to_string(),
            id: id.clone(),
        })?;

    Ok(Json(EventForm::edit(event)))
}

/// PUT /events/:id - Save the edit form over an existing event
async fn save_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<EventForm>,
) -> Result<StatusCode, AppError> {
    let patch = form.to_patch()?;
    state.remote.update_event(&id, &patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /events/:id - Delete an event
async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.remote.delete_event(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use famcal_core::form::DEFAULT_TITLE;
    use famcal_core::{Member, MemoryStore};
    use serde_json::{Value, json};
    use std::time::Duration;
    use tower::ServiceExt;

    fn app(state: AppState) -> Router {
        crate::routes::router().with_state(state)
    }

    fn state() -> AppState {
        AppState::new(MemoryStore::new(), chrono_tz::Tz::UTC)
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn wait_for_events(state: &AppState, count: usize) {
        let mut watch = state.live.watch();
        tokio::time::timeout(
            Duration::from_secs(2),
            watch.wait_for(|s| !s.loading && s.events.len() == count),
        )
        .await
        .unwrap()
        .unwrap();
    }

    fn soccer_form() -> Value {
        json!({
            "title": "Soccer practice",
            "start": "2024-06-01T16:00:00Z",
            "end": "2024-06-01T17:30:00Z",
            "category": "Sport",
            "assignedTo": "Milo"
        })
    }

    #[tokio::test]
    async fn test_create_then_list_filtered() {
        let state = state();

        let (status, body) = send(app(state.clone()), "POST", "/events", Some(soccer_form())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["id"].is_string());

        wait_for_events(&state, 1).await;

        let (status, body) = send(app(state.clone()), "GET", "/events?member=Milo", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["events"][0]["title"], "Soccer practice");
        assert_eq!(body["loading"], false);

        let (_, body) = send(app(state), "GET", "/events?member=Maya", None).await;
        assert_eq!(body["events"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_invalid_form_is_bad_request() {
        let mut form = soccer_form();
        form["end"] = json!("2024-06-01T15:00:00Z");

        let (status, body) = send(app(state()), "POST", "/events", Some(form)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_patch_and_delete() {
        let state = state();
        let (_, body) = send(app(state.clone()), "POST", "/events", Some(soccer_form())).await;
        let id = body["id"].as_str().unwrap().to_string();

        let uri = format!("/events/{}", id);
        let (status, _) = send(
            app(state.clone()),
            "PATCH",
            &uri,
            Some(json!({ "assignedTo": "Maya" })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let mut watch = state.live.watch();
        tokio::time::timeout(
            Duration::from_secs(2),
            watch.wait_for(|s| s.events.iter().any(|e| e.assigned_to == Member::Maya)),
        )
        .await
        .unwrap()
        .unwrap();

        let (status, _) = send(app(state.clone()), "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        wait_for_events(&state, 0).await;
    }

    #[tokio::test]
    async fn test_patch_missing_event_is_not_found() {
        let (status, _) = send(
            app(state()),
            "PATCH",
            "/events/nope",
            Some(json!({ "title": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    async fn only_event(state: &AppState) -> CalendarEvent {
        let mut watch = state.live.watch();
        let snapshot = tokio::time::timeout(
            Duration::from_secs(2),
            watch.wait_for(|s| !s.loading && s.events.len() == 1),
        )
        .await
        .unwrap()
        .unwrap()
        .clone();
        snapshot.events[0].clone()
    }

    #[tokio::test]
    async fn test_patch_ignores_id_and_created_at() {
        let state = state();
        let (_, body) = send(app(state.clone()), "POST", "/events", Some(soccer_form())).await;
        let id = body["id"].as_str().unwrap().to_string();
        let original = only_event(&state).await;

        let (status, _) = send(
            app(state.clone()),
            "PATCH",
            &format!("/events/{}", id),
            Some(json!({
                "assignedTo": "Maya",
                "id": "someone-else",
                "createdAt": "2020-01-01T00:00:00Z"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let mut watch = state.live.watch();
        let snapshot = tokio::time::timeout(
            Duration::from_secs(2),
            watch.wait_for(|s| s.events.iter().any(|e| e.assigned_to == Member::Maya)),
        )
        .await
        .unwrap()
        .unwrap()
        .clone();

        let updated = &snapshot.events[0];
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(
            *updated,
            CalendarEvent {
                assigned_to: Member::Maya,
                ..original
            }
        );
    }

    #[tokio::test]
    async fn test_edit_form_round_trip() {
        let state = state();
        let (_, body) = send(app(state.clone()), "POST", "/events", Some(soccer_form())).await;
        let id = body["id"].as_str().unwrap().to_string();
        let original = only_event(&state).await;

        let uri = format!("/events/{}/form", id);
        let (status, mut form) = send(app(state.clone()), "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(form["title"], "Soccer practice");
        assert_eq!(form["assignedTo"], "Milo");

        form["title"] = json!("");
        form["location"] = json!("City park");
        let (status, _) =
            send(app(state.clone()), "PUT", &format!("/events/{}", id), Some(form)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let mut watch = state.live.watch();
        let snapshot = tokio::time::timeout(
            Duration::from_secs(2),
            watch.wait_for(|s| s.events.iter().any(|e| e.title == DEFAULT_TITLE)),
        )
        .await
        .unwrap()
        .unwrap()
        .clone();

        let saved = &snapshot.events[0];
        assert_eq!(saved.description, "📍 City park");
        assert_eq!(saved.start_date, original.start_date);
        assert_eq!(saved.created_at, original.created_at);
    }

    #[tokio::test]
    async fn test_edit_form_for_missing_event_is_not_found() {
        let (status, _) = send(app(state()), "GET", "/events/nope/form", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let mut form = soccer_form();
        form["end"] = json!("2024-06-01T15:00:00Z");
        let (status, _) = send(app(state()), "PUT", "/events/nope", Some(form)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(app(state()), "PUT", "/events/nope", Some(soccer_form())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
