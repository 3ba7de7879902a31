//! Application handlers.
//!
//! Orchestrate domain operations over the ports.

pub mod consultation;

pub use consultation::{
    ConsultationService, DialogueController, DialogueError, DialogueSettings, DisplaySink,
    HealthTipGenerator, ServiceError, SessionView, SuggestionGenerator, TipBoard, TurnRequest,
    TurnResult, TurnView,
};
