//! Consultation session aggregate.
//!
//! Owns the transcript plus the stage and turn counters, and enforces the
//! rules for when a turn counts, when the report is forced, and which
//! shortcuts are offered. Gateway calls live in the application layer; the
//! session only records their outcome.

use std::sync::Arc;

use serde::Serialize;

use super::errors::ConsultationError;
use super::message::{Message, Role};
use super::profile::InterviewProfile;
use super::report::ReportArtifact;
use super::report_detector::ReportDetector;
use super::shortcuts::{Shortcut, ShortcutAction};
use super::stage::Stage;
use super::transcript::Transcript;
use super::turn_limit::TurnLimit;
use crate::domain::foundation::{SessionId, StateMachine, Timestamp, ValidationError};

/// What a committed assistant turn did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TurnOutcome {
    /// Stage after the commit.
    pub stage: Stage,
    /// True if this reply moved the session into `Reported`.
    pub report_ready: bool,
    /// True if suggestions should be generated from the reply.
    pub wants_suggestions: bool,
}

/// One consultation: transcript, stage, counters and suggestions.
///
/// # Invariants
///
/// - `turn_count` only grows for user turns submitted while interviewing
/// - `suggestions` is empty unless interviewing with an assistant reply last
/// - the transcript never holds a partial assistant message
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    profile: Arc<InterviewProfile>,
    transcript: Transcript,
    stage: Stage,
    turn_count: u32,
    turn_limit: TurnLimit,
    suggestions: Vec<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Session {
    /// Creates a session showing the configuration prompt and greeting.
    pub fn new(
        id: SessionId,
        profile: Arc<InterviewProfile>,
        turn_limit: TurnLimit,
    ) -> Result<Self, ValidationError> {
        let transcript = Transcript::opening(&profile.system_prompt, &profile.greeting)?;
        let now = Timestamp::now();
        Ok(Self {
            id,
            profile,
            transcript,
            stage: Stage::Intake,
            turn_count: 0,
            turn_limit,
            suggestions: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    // ═══════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn profile(&self) -> &InterviewProfile {
        &self.profile
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn turn_limit(&self) -> TurnLimit {
        self.turn_limit
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// Role-tagged transcript for the gateway. Notices are left out.
    pub fn gateway_messages(&self) -> impl Iterator<Item = (Role, &str)> + '_ {
        self.transcript.gateway_messages()
    }

    /// Messages to display, without configuration or control signals.
    pub fn rendered_messages(&self) -> impl Iterator<Item = &Message> + '_ {
        self.transcript.rendered(&self.profile.termination_signal)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════

    /// True when the latest gateway-facing message is from the user side,
    /// meaning an assistant reply is owed.
    pub fn is_awaiting_response(&self) -> bool {
        self.transcript
            .last_gateway_facing()
            .map(|m| m.kind().is_user_side())
            .unwrap_or(false)
    }

    /// True if the owed reply must be the report.
    ///
    /// Holds when the latest user-side message is the control signal, when
    /// the turn cap has been reached, or when the latest user text asks for
    /// the report in so many words.
    pub fn is_report_turn(&self) -> bool {
        let signalled = match self.transcript.last_user_side() {
            Some(m) if m.is_control_signal() => true,
            Some(m) => self.profile.requests_report(m.content()),
            None => false,
        };
        signalled || self.turn_limit.is_reached(self.turn_count)
    }

    /// The report, if one has been produced.
    pub fn report(&self) -> Result<ReportArtifact, ConsultationError> {
        if !self.stage.has_report() {
            return Err(ConsultationError::ReportNotReady);
        }
        self.transcript
            .last_assistant()
            .map(|m| ReportArtifact::new(m.content(), *m.created_at()))
            .ok_or(ConsultationError::ReportNotReady)
    }

    /// Shortcuts the user may press right now.
    ///
    /// Intake offers the symptom catalog until the first message; the
    /// interview offers the current suggestions and the finish action; the
    /// report offers follow-up prompts. Nothing is offered while a reply is
    /// owed.
    pub fn available_shortcuts(&self) -> Vec<Shortcut> {
        if self.is_awaiting_response() {
            return Vec::new();
        }
        match self.stage {
            Stage::Intake if self.transcript.len() == 2 => self
                .profile
                .intake_prompts
                .iter()
                .map(Shortcut::from_prompt)
                .collect(),
            Stage::Intake => Vec::new(),
            Stage::Interviewing => self
                .suggestions
                .iter()
                .enumerate()
                .map(|(i, text)| Shortcut::suggestion(i, text))
                .chain(std::iter::once(Shortcut::finish(
                    self.profile.finish_label.clone(),
                )))
                .collect(),
            Stage::Reported => self
                .profile
                .follow_up_prompts
                .iter()
                .map(Shortcut::from_prompt)
                .collect(),
        }
    }

    /// Looks up a currently available shortcut.
    pub fn resolve_shortcut(&self, shortcut_id: &str) -> Result<ShortcutAction, ConsultationError> {
        self.available_shortcuts()
            .into_iter()
            .find(|s| s.id == shortcut_id)
            .map(|s| s.action)
            .ok_or_else(|| ConsultationError::UnknownShortcut(shortcut_id.to_string()))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Commands
    // ═══════════════════════════════════════════════════════════════════

    /// Records a user turn.
    ///
    /// The first message opens the interview without counting. Interview
    /// turns count, and the turn that reaches the cap is followed by the
    /// control signal. Turns after the report are follow-ups. Text equal to
    /// the termination signal is handled as [`finish`](Self::finish).
    ///
    /// # Errors
    ///
    /// - `EmptyMessage` for blank text
    /// - `AwaitingResponse` if the previous turn has no reply yet
    /// - `CannotFinish` if the termination signal is typed outside the interview
    pub fn submit(&mut self, text: &str) -> Result<(), ConsultationError> {
        if text.trim().is_empty() {
            return Err(ConsultationError::EmptyMessage);
        }
        if self.is_awaiting_response() {
            return Err(ConsultationError::AwaitingResponse);
        }
        if text == self.profile.termination_signal {
            return self.finish();
        }

        self.transcript.push(Message::user(text)?);
        self.suggestions.clear();

        match self.stage {
            Stage::Intake => self.transition(Stage::Interviewing)?,
            Stage::Interviewing => {
                self.turn_count = self.turn_count.saturating_add(1);
                if self.turn_limit.is_reached(self.turn_count) {
                    self.push_control_signal()?;
                }
            }
            Stage::Reported => {}
        }
        self.touch();
        Ok(())
    }

    /// Asks for the report now.
    ///
    /// # Errors
    ///
    /// - `CannotFinish` outside the interview
    /// - `AwaitingResponse` if the previous turn has no reply yet
    pub fn finish(&mut self) -> Result<(), ConsultationError> {
        if self.stage != Stage::Interviewing {
            return Err(ConsultationError::CannotFinish(self.stage));
        }
        if self.is_awaiting_response() {
            return Err(ConsultationError::AwaitingResponse);
        }
        self.suggestions.clear();
        self.push_control_signal()?;
        self.touch();
        Ok(())
    }

    /// Fails unless a reply is owed.
    pub fn ensure_pending(&self) -> Result<(), ConsultationError> {
        if self.is_awaiting_response() {
            Ok(())
        } else {
            Err(ConsultationError::NothingPending)
        }
    }

    /// Appends the complete assistant reply and settles the stage.
    ///
    /// During the interview the session moves to `Reported` when this was a
    /// report turn or the reply itself reads as a report.
    pub fn commit_response(
        &mut self,
        text: &str,
        detector: &dyn ReportDetector,
    ) -> Result<TurnOutcome, ConsultationError> {
        self.ensure_pending()?;
        let report_turn = self.is_report_turn();
        self.transcript.push(Message::assistant(text)?);
        self.suggestions.clear();

        let mut report_ready = false;
        if self.stage == Stage::Interviewing && (report_turn || detector.is_report(text)) {
            self.transition(Stage::Reported)?;
            report_ready = true;
        }
        self.touch();

        Ok(TurnOutcome {
            stage: self.stage,
            report_ready,
            wants_suggestions: self.stage.offers_suggestions(),
        })
    }

    /// Appends a visible notice for a failed reply.
    ///
    /// The pending user turn stays pending so it can be retried.
    pub fn record_failure(&mut self, notice: &str) -> Result<(), ConsultationError> {
        self.transcript.push(Message::notice(notice)?);
        self.suggestions.clear();
        self.touch();
        Ok(())
    }

    /// Stores reply suggestions if they are still relevant.
    ///
    /// Ignored unless interviewing with an assistant reply as the latest
    /// message. Returns whether they were kept.
    pub fn set_suggestions(&mut self, suggestions: Vec<String>) -> bool {
        let relevant = self.stage.offers_suggestions()
            && self.transcript.last().map(Message::is_assistant).unwrap_or(false);
        if relevant {
            self.suggestions = suggestions;
        } else {
            self.suggestions.clear();
        }
        relevant
    }

    /// Back to the greeting. The id is kept.
    pub fn reset(&mut self) -> Result<(), ValidationError> {
        self.transcript = Transcript::opening(&self.profile.system_prompt, &self.profile.greeting)?;
        self.stage = Stage::Intake;
        self.turn_count = 0;
        self.suggestions.clear();
        self.touch();
        Ok(())
    }

    fn push_control_signal(&mut self) -> Result<(), ValidationError> {
        let signal = Message::control_signal(self.profile.termination_signal.as_str())?;
        self.transcript.push(signal);
        Ok(())
    }

    fn transition(&mut self, target: Stage) -> Result<(), ConsultationError> {
        let from = self.stage;
        self.stage = from
            .transition_to(target)
            .map_err(|_| ConsultationError::InvalidTransition { from, to: target })?;
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}
