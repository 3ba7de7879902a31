//! Application layer - use cases and their orchestration.
//!
//! This layer coordinates domain operations with the ports: it owns the
//! gateway calls, the session locking, and the tip board.

pub mod handlers;

pub use handlers::{
    ConsultationService, DialogueController, DialogueError, DialogueSettings, DisplaySink,
    HealthTipGenerator, ServiceError, SessionView, SuggestionGenerator, TipBoard, TurnRequest,
    TurnResult, TurnView,
};
