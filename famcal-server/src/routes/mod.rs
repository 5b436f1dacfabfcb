pub mod calendar;
pub mod events;
pub mod household;
pub mod live;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use famcal_core::{FamCalError, Member};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(events::router())
        .merge(calendar::router())
        .merge(household::router())
        .merge(live::router())
}

/// `?member=Milo` narrows a listing to one household member.
#[derive(Debug, Default, Deserialize)]
pub struct MemberFilter {
    pub member: Option<Member>,
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert errors to HTTP responses
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<FamCalError>() {
            Some(FamCalError::Validation(_)) => StatusCode::BAD_REQUEST,
            Some(FamCalError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Some(FamCalError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{:#}", self.0);
        }
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
