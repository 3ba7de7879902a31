//! HTTP adapters - REST and WebSocket API.

pub mod consultation;
pub mod router;
pub mod tips;

pub use consultation::{ConsultationAppState, ErrorResponse};
pub use router::app_router;
