//! Axum routes for consultation endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    create_consultation, download_report, finish_consultation, get_consultation, press_shortcut,
    reset_consultation, retry_turn, submit_message, ConsultationAppState,
};
use super::ws_handler::consultation_ws_handler;

/// Creates routes for consultation endpoints.
///
/// REST Endpoints:
/// - POST /consultations - Start a consultation
/// - GET /consultations/:id - Current snapshot
/// - POST /consultations/:id/messages - Submit a message
/// - POST /consultations/:id/shortcuts/:shortcut_id - Press a shortcut
/// - POST /consultations/:id/finish - Ask for the report now
/// - POST /consultations/:id/retry - Retry after a failed reply
/// - POST /consultations/:id/reset - Start over
/// - GET /consultations/:id/report - Download the report
///
/// WebSocket Endpoints:
/// - WS /consultations/:id/stream - Streamed turns
pub fn consultation_routes() -> Router<ConsultationAppState> {
    Router::new()
        .route("/consultations", post(create_consultation))
        .route("/consultations/:id", get(get_consultation))
        .route("/consultations/:id/messages", post(submit_message))
        .route("/consultations/:id/shortcuts/:shortcut_id", post(press_shortcut))
        .route("/consultations/:id/finish", post(finish_consultation))
        .route("/consultations/:id/retry", post(retry_turn))
        .route("/consultations/:id/reset", post(reset_consultation))
        .route("/consultations/:id/report", get(download_report))
        .route("/consultations/:id/stream", get(consultation_ws_handler))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consultation_routes_creates_valid_router() {
        let _routes = consultation_routes();
    }
}
