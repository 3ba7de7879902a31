//! Consultation stage state machine.
//!
//! A consultation moves from intake, through a question-and-answer
//! interview, into a reported state where only follow-up questions remain.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// The high-level phase of a consultation.
///
/// - `Intake`: greeting shown, nothing said by the user yet
/// - `Interviewing`: the model asks one diagnostic question per turn
/// - `Reported`: the final report has been produced; follow-ups only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Opening screen, waiting for the first user input.
    #[default]
    Intake,

    /// Diagnostic questioning in progress.
    Interviewing,

    /// Report delivered. Follow-up turns append without changing stage.
    Reported,
}

impl Stage {
    /// Returns a short label suitable for a stage indicator.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Intake => "Intake",
            Self::Interviewing => "Interviewing",
            Self::Reported => "Report ready",
        }
    }

    /// Returns true if genuine user turns advance the turn counter.
    pub fn counts_turns(&self) -> bool {
        matches!(self, Self::Interviewing)
    }

    /// Returns true if smart-reply suggestions may be shown.
    pub fn offers_suggestions(&self) -> bool {
        matches!(self, Self::Interviewing)
    }

    /// Returns true if the report artifact can be downloaded.
    pub fn has_report(&self) -> bool {
        matches!(self, Self::Reported)
    }
}

impl StateMachine for Stage {
    fn can_transition_to(&self, target: &Self) -> bool {
        use Stage::*;
        matches!(
            (self, target),
            // First user input opens the interview
            (Intake, Interviewing) |
            // Turn cap, explicit finish, or a self-terminated report
            (Interviewing, Reported)
        )
    }
}
