//! Household roster and category endpoints

use axum::{Json, Router, routing::get};
use famcal_core::Category;
use famcal_core::household::{MemberProfile, ROSTER};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/members", get(list_members))
        .route("/categories", get(list_categories))
}

/// GET /members - Who events can be assigned to
async fn list_members() -> Json<&'static [MemberProfile]> {
    Json(&ROSTER)
}

/// GET /categories - Available event categories
async fn list_categories() -> Json<[Category; 4]> {
    Json(Category::ALL)
}
