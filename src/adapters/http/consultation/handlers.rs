//! HTTP handlers for consultation endpoints.
//!
//! These handlers connect Axum routes to the consultation service.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;

use crate::application::handlers::consultation::{
    ConsultationService, ServiceError, TipBoard, TurnRequest,
};
use crate::domain::foundation::{ErrorCode, SessionId};

use super::dto::{ErrorResponse, SubmitMessageRequest};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state for consultation and tip handlers.
#[derive(Clone)]
pub struct ConsultationAppState {
    pub service: ConsultationService,
    pub tips: Arc<TipBoard>,
}

impl ConsultationAppState {
    pub fn new(service: ConsultationService, tips: Arc<TipBoard>) -> Self {
        Self { service, tips }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Session lifecycle
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/consultations - Start a consultation at the greeting.
pub async fn create_consultation(
    State(state): State<ConsultationAppState>,
) -> Result<impl IntoResponse, ConsultationApiError> {
    let view = state.service.create().await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/consultations/:id - Current snapshot of a consultation.
///
/// # Errors
/// - 404 Not Found: Unknown consultation
/// - 409 Conflict: A turn is in flight
pub async fn get_consultation(
    State(state): State<ConsultationAppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ConsultationApiError> {
    let id = parse_session_id(&id)?;
    let view = state.service.view(id).await?;
    Ok((StatusCode::OK, Json(view)))
}

/// POST /api/consultations/:id/reset - Back to the greeting, same id.
pub async fn reset_consultation(
    State(state): State<ConsultationAppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ConsultationApiError> {
    let id = parse_session_id(&id)?;
    let view = state.service.reset(id).await?;
    Ok((StatusCode::OK, Json(view)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Turns
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/consultations/:id/messages - Submit a user message.
///
/// Responds once the reply is complete. Use the stream endpoint to see
/// increments as they arrive. The turn runs on its own task, so a client
/// that disconnects early still finds the reply (or a notice) on return.
///
/// # Errors
/// - 400 Bad Request: Empty message
/// - 409 Conflict: Reply still owed, or a turn is in flight
/// - 502 Bad Gateway: The assistant could not respond
pub async fn submit_message(
    State(state): State<ConsultationAppState>,
    Path(id): Path<String>,
    Json(request): Json<SubmitMessageRequest>,
) -> Result<impl IntoResponse, ConsultationApiError> {
    let id = parse_session_id(&id)?;
    let turn = state
        .service
        .run_turn_detached(id, TurnRequest::Submit(request.content))
        .await?;
    Ok((StatusCode::OK, Json(turn)))
}

/// POST /api/consultations/:id/shortcuts/:shortcut_id - Press a shortcut.
pub async fn press_shortcut(
    State(state): State<ConsultationAppState>,
    Path((id, shortcut_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ConsultationApiError> {
    let id = parse_session_id(&id)?;
    let turn = state
        .service
        .run_turn_detached(id, TurnRequest::Shortcut(shortcut_id))
        .await?;
    Ok((StatusCode::OK, Json(turn)))
}

/// POST /api/consultations/:id/finish - Ask for the report now.
pub async fn finish_consultation(
    State(state): State<ConsultationAppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ConsultationApiError> {
    let id = parse_session_id(&id)?;
    let turn = state.service.run_turn_detached(id, TurnRequest::Finish).await?;
    Ok((StatusCode::OK, Json(turn)))
}

/// POST /api/consultations/:id/retry - Retry the reply owed after a failure.
pub async fn retry_turn(
    State(state): State<ConsultationAppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ConsultationApiError> {
    let id = parse_session_id(&id)?;
    let turn = state.service.run_turn_detached(id, TurnRequest::Retry).await?;
    Ok((StatusCode::OK, Json(turn)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Report
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/consultations/:id/report - Download the report as Markdown.
///
/// # Errors
/// - 409 Conflict: No report has been produced yet
pub async fn download_report(
    State(state): State<ConsultationAppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ConsultationApiError> {
    let id = parse_session_id(&id)?;
    let report = state.service.report(id).await?;

    let disposition = format!("attachment; filename=\"{}\"", report.filename());
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, report.media_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.into_content(),
    ))
}

// ════════════════════════════════════════════════════════════════════════════════
// Helper Functions
// ════════════════════════════════════════════════════════════════════════════════

pub(crate) fn parse_session_id(raw: &str) -> Result<SessionId, ConsultationApiError> {
    raw.parse()
        .map_err(|_| ConsultationApiError::BadRequest("Invalid consultation ID format".to_string()))
}

pub(crate) fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed | ErrorCode::EmptyField => StatusCode::BAD_REQUEST,
        ErrorCode::SessionNotFound | ErrorCode::ShortcutNotFound => StatusCode::NOT_FOUND,
        ErrorCode::InvalidStateTransition
        | ErrorCode::AwaitingResponse
        | ErrorCode::NothingPending
        | ErrorCode::ReportNotReady
        | ErrorCode::SessionBusy => StatusCode::CONFLICT,
        ErrorCode::AIProviderError => StatusCode::BAD_GATEWAY,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts service errors to HTTP responses.
#[derive(Debug)]
pub enum ConsultationApiError {
    BadRequest(String),
    Service(ServiceError),
}

impl From<ServiceError> for ConsultationApiError {
    fn from(err: ServiceError) -> Self {
        Self::Service(err)
    }
}

impl IntoResponse for ConsultationApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ConsultationApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg))
            }
            ConsultationApiError::Service(err) => {
                let code = err.code();
                let status = status_for(code);
                if status.is_server_error() {
                    tracing::error!(error = %err, "Consultation request failed");
                }
                let body = match &err {
                    ServiceError::Storage(_) | ServiceError::Interrupted(_) => {
                        ErrorResponse::internal("An internal error occurred")
                    }
                    ServiceError::Gateway(ai) => ErrorResponse::new(code, err.to_string())
                        .with_details(serde_json::json!({ "retryable": ai.is_retryable() })),
                    _ => ErrorResponse::new(code, err.to_string()),
                };
                (status, body)
            }
        };

        (status, Json(error)).into_response()
    }
}
