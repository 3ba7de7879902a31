//! Health-tip handlers.
//!
//! Tips never fail: a gateway problem shows a fallback tip instead.

use axum::extract::{Json, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;

use crate::adapters::http::consultation::ConsultationAppState;

/// GET /api/tips/current - The tip on display.
pub async fn current_tip(State(state): State<ConsultationAppState>) -> impl IntoResponse {
    Json(state.tips.current().await)
}

/// POST /api/tips/refresh - Replace the tip with a freshly generated one.
pub async fn refresh_tip(State(state): State<ConsultationAppState>) -> impl IntoResponse {
    Json(state.tips.refresh().await)
}

pub fn tips_routes() -> Router<ConsultationAppState> {
    Router::new()
        .route("/tips/current", get(current_tip))
        .route("/tips/refresh", post(refresh_tip))
}
