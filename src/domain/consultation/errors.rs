//! Errors raised by consultation operations.

use thiserror::Error;

use super::stage::Stage;
use crate::domain::foundation::{ErrorCode, ValidationError};

/// Rejections of a caller request against the session's current state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConsultationError {
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("A response to the previous turn is still pending; retry it first")]
    AwaitingResponse,

    #[error("No turn is waiting for a response")]
    NothingPending,

    #[error("Cannot finish the interview while in stage {0:?}")]
    CannotFinish(Stage),

    #[error("The report is not ready yet")]
    ReportNotReady,

    #[error("Unknown shortcut: {0}")]
    UnknownShortcut(String),

    #[error("Invalid stage transition from {from:?} to {to:?}")]
    InvalidTransition { from: Stage, to: Stage },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ConsultationError {
    /// Shared error code for this rejection.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyMessage => ErrorCode::EmptyField,
            Self::AwaitingResponse => ErrorCode::AwaitingResponse,
            Self::NothingPending => ErrorCode::NothingPending,
            Self::CannotFinish(_) | Self::InvalidTransition { .. } => {
                ErrorCode::InvalidStateTransition
            }
            Self::ReportNotReady => ErrorCode::ReportNotReady,
            Self::UnknownShortcut(_) => ErrorCode::ShortcutNotFound,
            Self::Validation(_) => ErrorCode::ValidationFailed,
        }
    }
}
