//! HTTP adapter for consultations.
//!
//! REST endpoints run a turn to completion; the WebSocket endpoint relays
//! reply increments while the turn is in flight.

mod dto;
mod handlers;
mod routes;
mod ws_handler;

pub use dto::{ErrorResponse, SubmitMessageRequest, WsClientMessage, WsServerMessage};
pub use handlers::{ConsultationApiError, ConsultationAppState};
pub use routes::consultation_routes;
pub use ws_handler::consultation_ws_handler;
