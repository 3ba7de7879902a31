//! HTTP DTOs for consultation endpoints.
//!
//! Session snapshots are served as the application's `SessionView`; this
//! module holds the request bodies, the WebSocket protocol and error bodies.

use serde::{Deserialize, Serialize};

use crate::application::handlers::consultation::{SessionView, TurnRequest};
use crate::domain::foundation::ErrorCode;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/consultations/:id/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitMessageRequest {
    pub content: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// WebSocket Protocol
// ════════════════════════════════════════════════════════════════════════════════

/// Messages a client sends over the consultation stream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsClientMessage {
    Submit { content: String },
    Shortcut { shortcut_id: String },
    Finish,
    Retry,
}

impl From<WsClientMessage> for TurnRequest {
    fn from(msg: WsClientMessage) -> Self {
        match msg {
            WsClientMessage::Submit { content } => TurnRequest::Submit(content),
            WsClientMessage::Shortcut { shortcut_id } => TurnRequest::Shortcut(shortcut_id),
            WsClientMessage::Finish => TurnRequest::Finish,
            WsClientMessage::Retry => TurnRequest::Retry,
        }
    }
}

/// Messages the server sends over the consultation stream.
///
/// A turn is zero or more `Delta`s followed by exactly one `TurnComplete`
/// or `Error`. Deltas are display-only until `TurnComplete` arrives.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsServerMessage {
    Delta {
        content: String,
    },
    TurnComplete {
        session: SessionView,
        report_ready: bool,
    },
    Error {
        code: String,
        message: String,
    },
}

impl WsServerMessage {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Response
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
