//! Consultation module - the guided interview aggregate and its rules.
//!
//! A consultation moves through three stages:
//!
//! ```text
//! Intake ──first message──▶ Interviewing ──cap / finish / report reply──▶ Reported
//!    ▲                                                                         │
//!    └───────────────────────────────── reset ──────────────────────────────────┘
//! ```
//!
//! # Module Structure
//!
//! - `session` - Session aggregate with turn and stage bookkeeping
//! - `transcript` / `message` - Append-only typed message log
//! - `stage` / `turn_limit` - Stage state machine and turn cap policy
//! - `report_detector` - "Does this reply look like a report" predicate
//! - `suggestions` - Smart-reply prompt and sanitiser
//! - `profile` / `shortcuts` - Prompts, signals and canned actions
//! - `report` - Downloadable report artifact

mod errors;
mod message;
mod profile;
mod report;
mod report_detector;
mod session;
mod shortcuts;
mod stage;
mod suggestions;
mod transcript;
mod turn_limit;

pub use errors::ConsultationError;
pub use message::{Message, MessageKind, Role};
pub use profile::{InterviewProfile, TERMINATION_SIGNAL};
pub use report::{ReportArtifact, REPORT_FILENAME, REPORT_MEDIA_TYPE};
pub use report_detector::{HeadingReportDetector, ReportDetector};
pub use session::{Session, TurnOutcome};
pub use shortcuts::{
    CannedPrompt, Shortcut, ShortcutAction, FINISH_SHORTCUT_ID, SUGGESTION_SHORTCUT_PREFIX,
};
pub use stage::Stage;
pub use suggestions::{
    default_suggestions, sanitize_suggestions, suggestion_prompt, DEFAULT_SUGGESTIONS,
    MAX_SUGGESTIONS, MIN_SUGGESTIONS,
};
pub use transcript::Transcript;
pub use turn_limit::TurnLimit;
