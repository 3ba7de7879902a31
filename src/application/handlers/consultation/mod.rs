//! Consultation handlers.
//!
//! The dialogue controller runs turns against a session; the service wraps
//! it with session lookup and single-flight locking. Suggestions and tips
//! are separate, failure-tolerant gateway calls.

mod consultation_service;
mod dialogue_controller;
mod health_tip_generator;
mod suggestion_generator;

pub use consultation_service::{
    ConsultationService, ServiceError, SessionView, TurnRequest, TurnView,
};
pub use dialogue_controller::{
    DialogueController, DialogueError, DialogueSettings, DisplaySink, TurnResult,
    DIALOGUE_TEMPERATURE,
};
pub use health_tip_generator::{HealthTipGenerator, TipBoard, TIP_TEMPERATURE};
pub use suggestion_generator::{SuggestionGenerator, SUGGESTION_TEMPERATURE};
