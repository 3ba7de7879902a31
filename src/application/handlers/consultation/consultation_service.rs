//! Consultation service.
//!
//! Maps session ids to sessions, enforces one in-flight operation per
//! session, and exposes every consultation operation to the HTTP layer.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use super::dialogue_controller::{DialogueController, DialogueError, DisplaySink, TurnResult};
use crate::domain::consultation::{
    ConsultationError, InterviewProfile, Message, ReportArtifact, Session, Shortcut,
    ShortcutAction, Stage, TurnLimit,
};
use crate::domain::foundation::{ErrorCode, SessionId, Timestamp};
use crate::ports::{AIError, SessionStore, SessionStoreError, SharedSession};

/// Errors surfaced by the consultation service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Consultation not found: {0}")]
    NotFound(SessionId),

    #[error("Consultation {0} is busy with another request")]
    Busy(SessionId),

    #[error(transparent)]
    Consultation(#[from] ConsultationError),

    #[error("The assistant could not respond: {0}")]
    Gateway(AIError),

    #[error("Session storage error: {0}")]
    Storage(#[from] SessionStoreError),

    #[error("Turn task ended abnormally: {0}")]
    Interrupted(String),
}

impl ServiceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::SessionNotFound,
            Self::Busy(_) => ErrorCode::SessionBusy,
            Self::Consultation(err) => err.code(),
            Self::Gateway(_) => ErrorCode::AIProviderError,
            Self::Storage(_) | Self::Interrupted(_) => ErrorCode::InternalError,
        }
    }
}

impl From<DialogueError> for ServiceError {
    fn from(err: DialogueError) -> Self {
        match err {
            DialogueError::Consultation(err) => Self::Consultation(err),
            DialogueError::Gateway(err) => Self::Gateway(err),
        }
    }
}

/// Read model of a session for clients.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: SessionId,
    pub stage: Stage,
    pub stage_label: &'static str,
    pub turn_count: u32,
    /// `None` when uncapped.
    pub turn_limit: Option<u32>,
    /// Rendered transcript: no configuration, no control signals.
    pub messages: Vec<Message>,
    pub suggestions: Vec<String>,
    pub shortcuts: Vec<Shortcut>,
    /// True while a reply is owed; `retry` is then the way forward.
    pub awaiting_response: bool,
    pub report_available: bool,
    pub updated_at: Timestamp,
}

impl SessionView {
    pub fn from_session(session: &Session) -> Self {
        Self {
            id: *session.id(),
            stage: session.stage(),
            stage_label: session.stage().label(),
            turn_count: session.turn_count(),
            turn_limit: session.turn_limit().as_option(),
            messages: session.rendered_messages().cloned().collect(),
            suggestions: session.suggestions().to_vec(),
            shortcuts: session.available_shortcuts(),
            awaiting_response: session.is_awaiting_response(),
            report_available: session.stage().has_report(),
            updated_at: *session.updated_at(),
        }
    }
}

/// A session view after a completed turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnView {
    pub session: SessionView,
    /// True if this turn produced the report.
    pub report_ready: bool,
}

/// Which operation drives a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnRequest {
    Submit(String),
    Shortcut(String),
    Finish,
    Retry,
}

/// Entry point for consultation operations.
#[derive(Clone)]
pub struct ConsultationService {
    store: Arc<dyn SessionStore>,
    controller: DialogueController,
    profile: Arc<InterviewProfile>,
    turn_limit: TurnLimit,
}

impl ConsultationService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        controller: DialogueController,
        profile: Arc<InterviewProfile>,
        turn_limit: TurnLimit,
    ) -> Self {
        Self {
            store,
            controller,
            profile,
            turn_limit,
        }
    }

    pub fn turn_limit(&self) -> TurnLimit {
        self.turn_limit
    }

    /// Starts a new consultation at the greeting.
    pub async fn create(&self) -> Result<SessionView, ServiceError> {
        let session = Session::new(SessionId::new(), Arc::clone(&self.profile), self.turn_limit)
            .map_err(ConsultationError::from)?;
        let view = SessionView::from_session(&session);
        self.store.insert(session).await?;
        tracing::info!(session_id = %view.id, turn_limit = ?view.turn_limit, "Consultation created");
        Ok(view)
    }

    pub async fn view(&self, id: SessionId) -> Result<SessionView, ServiceError> {
        let handle = self.handle(id).await?;
        let session = handle.try_lock().map_err(|_| ServiceError::Busy(id))?;
        Ok(SessionView::from_session(&session))
    }

    /// Runs one turn, streaming increments to `sink` when given.
    pub async fn run_turn(
        &self,
        id: SessionId,
        request: TurnRequest,
        sink: Option<&DisplaySink>,
    ) -> Result<TurnView, ServiceError> {
        let handle = self.handle(id).await?;
        let mut session = handle.try_lock().map_err(|_| ServiceError::Busy(id))?;

        let result: Result<TurnResult, DialogueError> = match request {
            TurnRequest::Submit(text) => self.controller.submit(&mut session, &text, sink).await,
            TurnRequest::Shortcut(shortcut_id) => match session.resolve_shortcut(&shortcut_id)? {
                ShortcutAction::Submit(text) => {
                    self.controller.submit(&mut session, &text, sink).await
                }
                ShortcutAction::Finish => self.controller.finish(&mut session, sink).await,
            },
            TurnRequest::Finish => self.controller.finish(&mut session, sink).await,
            TurnRequest::Retry => self.controller.respond(&mut session, sink).await,
        };

        let result = result?;
        Ok(TurnView {
            session: SessionView::from_session(&session),
            report_ready: result.outcome.report_ready,
        })
    }

    /// Runs one turn on its own task.
    ///
    /// The turn commits its reply or records a notice even when the
    /// caller stops waiting.
    pub async fn run_turn_detached(
        &self,
        id: SessionId,
        request: TurnRequest,
    ) -> Result<TurnView, ServiceError> {
        let service = self.clone();
        tokio::spawn(async move { service.run_turn(id, request, None).await })
            .await
            .map_err(|e| ServiceError::Interrupted(e.to_string()))?
    }

    pub async fn submit(
        &self,
        id: SessionId,
        text: impl Into<String>,
        sink: Option<&DisplaySink>,
    ) -> Result<TurnView, ServiceError> {
        self.run_turn(id, TurnRequest::Submit(text.into()), sink).await
    }

    pub async fn press_shortcut(
        &self,
        id: SessionId,
        shortcut_id: impl Into<String>,
        sink: Option<&DisplaySink>,
    ) -> Result<TurnView, ServiceError> {
        self.run_turn(id, TurnRequest::Shortcut(shortcut_id.into()), sink).await
    }

    pub async fn finish(
        &self,
        id: SessionId,
        sink: Option<&DisplaySink>,
    ) -> Result<TurnView, ServiceError> {
        self.run_turn(id, TurnRequest::Finish, sink).await
    }

    pub async fn retry(
        &self,
        id: SessionId,
        sink: Option<&DisplaySink>,
    ) -> Result<TurnView, ServiceError> {
        self.run_turn(id, TurnRequest::Retry, sink).await
    }

    /// Back to the greeting, keeping the id.
    pub async fn reset(&self, id: SessionId) -> Result<SessionView, ServiceError> {
        let handle = self.handle(id).await?;
        let mut session = handle.try_lock().map_err(|_| ServiceError::Busy(id))?;
        session.reset().map_err(ConsultationError::from)?;
        tracing::info!(session_id = %id, "Consultation reset");
        Ok(SessionView::from_session(&session))
    }

    pub async fn report(&self, id: SessionId) -> Result<ReportArtifact, ServiceError> {
        let handle = self.handle(id).await?;
        let session = handle.try_lock().map_err(|_| ServiceError::Busy(id))?;
        Ok(session.report()?)
    }

    async fn handle(&self, id: SessionId) -> Result<SharedSession, ServiceError> {
        self.store.get(&id).await?.ok_or(ServiceError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::adapters::ai::MockAIProvider;
    use crate::adapters::storage::InMemorySessionStore;
    use crate::application::handlers::consultation::{DialogueSettings, SuggestionGenerator};
    use crate::domain::consultation::{HeadingReportDetector, FINISH_SHORTCUT_ID};

    const REPORT: &str = "### 🩺 Pattern Differentiation\nKidney yang deficiency.\n";

    fn service_with(provider: MockAIProvider, limit: TurnLimit) -> ConsultationService {
        let provider = Arc::new(provider);
        let profile = InterviewProfile::wellness();
        let controller = DialogueController::new(
            provider.clone(),
            SuggestionGenerator::new(provider),
            Arc::new(HeadingReportDetector::new(profile.report_headings.iter())),
            DialogueSettings {
                stream: false,
                ..DialogueSettings::default()
            },
        );
        ConsultationService::new(
            Arc::new(InMemorySessionStore::new()),
            controller,
            profile,
            limit,
        )
    }

    #[tokio::test]
    async fn create_returns_intake_view() {
        let service = service_with(MockAIProvider::new(), TurnLimit::UNLIMITED);
        let view = service.create().await.unwrap();

        assert_eq!(view.stage, Stage::Intake);
        assert_eq!(view.messages.len(), 1);
        assert_eq!(view.turn_limit, None);
        assert_eq!(view.shortcuts.len(), 4);
        assert!(!view.report_available);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let service = service_with(MockAIProvider::new(), TurnLimit::UNLIMITED);
        let err = service.view(SessionId::new()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::SessionNotFound);
    }

    #[tokio::test]
    async fn intake_shortcut_submits_canned_text() {
        let provider = MockAIProvider::new().with_response("Since when?").with_response("Days|Weeks");
        let service = service_with(provider, TurnLimit::UNLIMITED);
        let id = service.create().await.unwrap().id;

        let turn = service.press_shortcut(id, "sleep", None).await.unwrap();

        assert_eq!(turn.session.stage, Stage::Interviewing);
        assert_eq!(turn.session.messages[1].content(), "I have not been able to sleep well lately");
        assert_eq!(turn.session.suggestions, vec!["Days", "Weeks"]);
        assert_eq!(
            turn.session.shortcuts.last().map(|s| s.id.as_str()),
            Some(FINISH_SHORTCUT_ID)
        );
    }

    #[tokio::test]
    async fn finish_shortcut_produces_report() {
        let provider = MockAIProvider::new()
            .with_response("Since when?")
            .with_response("Days|Weeks")
            .with_response(REPORT);
        let service = service_with(provider, TurnLimit::UNLIMITED);
        let id = service.create().await.unwrap().id;

        service.submit(id, "Cold feet", None).await.unwrap();
        let turn = service.press_shortcut(id, FINISH_SHORTCUT_ID, None).await.unwrap();

        assert!(turn.report_ready);
        assert!(turn.session.report_available);
        assert_eq!(service.report(id).await.unwrap().content(), REPORT);
    }

    #[tokio::test]
    async fn unknown_shortcut_is_rejected() {
        let service = service_with(MockAIProvider::new(), TurnLimit::UNLIMITED);
        let id = service.create().await.unwrap().id;

        let err = service.press_shortcut(id, "menu", None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ShortcutNotFound);
    }

    #[tokio::test]
    async fn report_before_reported_is_not_ready() {
        let service = service_with(MockAIProvider::new(), TurnLimit::UNLIMITED);
        let id = service.create().await.unwrap().id;
        let err = service.report(id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ReportNotReady);
    }

    #[tokio::test]
    async fn concurrent_turn_is_busy() {
        let provider = MockAIProvider::new()
            .with_response("Slow question?")
            .with_delay(Duration::from_millis(300));
        let service = service_with(provider, TurnLimit::UNLIMITED);
        let id = service.create().await.unwrap().id;

        let background = service.clone();
        let first = tokio::spawn(async move { background.submit(id, "Headache", None).await });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let err = service.submit(id, "Hello?", None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Busy(_)));
        assert!(first.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn reset_keeps_id() {
        let provider = MockAIProvider::new().with_response(REPORT);
        let service = service_with(provider, TurnLimit::UNLIMITED);
        let id = service.create().await.unwrap().id;
        service.submit(id, "Hair loss", None).await.unwrap();

        let view = service.reset(id).await.unwrap();

        assert_eq!(view.id, id);
        assert_eq!(view.stage, Stage::Intake);
        assert_eq!(view.turn_count, 0);
        assert_eq!(view.messages.len(), 1);
    }

    #[tokio::test]
    async fn detached_turn_commits_after_caller_gives_up() {
        let provider = MockAIProvider::new()
            .with_response("How long has this lasted?")
            .with_response("Days|Weeks")
            .with_delay(Duration::from_millis(100));
        let service = service_with(provider, TurnLimit::UNLIMITED);
        let id = service.create().await.unwrap().id;

        let abandoned = tokio::time::timeout(
            Duration::from_millis(20),
            service.run_turn_detached(id, TurnRequest::Submit("Cold feet".into())),
        )
        .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(600)).await;
        let view = service.view(id).await.unwrap();

        assert!(!view.awaiting_response);
        assert_eq!(view.stage, Stage::Interviewing);
        assert_eq!(
            view.messages.last().map(|m| m.content()),
            Some("How long has this lasted?")
        );
    }

    #[tokio::test]
    async fn detached_turn_reports_its_result() {
        let provider = MockAIProvider::new()
            .with_response("Since when?")
            .with_response("Days|Weeks");
        let service = service_with(provider, TurnLimit::UNLIMITED);
        let id = service.create().await.unwrap().id;

        let turn = service
            .run_turn_detached(id, TurnRequest::Submit("Cold feet".into()))
            .await
            .unwrap();

        assert_eq!(turn.session.turn_count, 1);
        assert_eq!(turn.session.suggestions, vec!["Days", "Weeks"]);
    }
}
