//! Dialogue controller.
//!
//! Drives one consultation turn: records the user input on the session,
//! sends the transcript to the gateway, commits the finished reply, moves the
//! stage, and refreshes the suggestions.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::timeout;

use super::suggestion_generator::SuggestionGenerator;
use crate::domain::consultation::{ConsultationError, ReportDetector, Session, TurnOutcome};
use crate::domain::foundation::ErrorCode;
use crate::ports::{
    AIError, AIProvider, CompletionRequest, FinishReason, RequestMetadata, RequestPurpose,
    TokenUsage,
};

/// Receives display increments while a reply streams in.
///
/// Increments are transient. The transcript only changes once the whole
/// reply has arrived.
pub type DisplaySink = mpsc::Sender<String>;

/// Default sampling temperature for dialogue turns.
pub const DIALOGUE_TEMPERATURE: f32 = 0.8;

/// Settings for dialogue turns.
#[derive(Debug, Clone)]
pub struct DialogueSettings {
    pub temperature: f32,
    /// Stream increments from the gateway instead of one atomic reply.
    pub stream: bool,
    /// Bound on a whole gateway call, streaming included.
    pub response_timeout: Duration,
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self {
            temperature: DIALOGUE_TEMPERATURE,
            stream: true,
            response_timeout: Duration::from_secs(180),
        }
    }
}

/// Errors from a dialogue turn.
#[derive(Debug, Error)]
pub enum DialogueError {
    #[error(transparent)]
    Consultation(#[from] ConsultationError),

    #[error("The assistant could not respond: {0}")]
    Gateway(#[from] AIError),
}

impl DialogueError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Consultation(err) => err.code(),
            Self::Gateway(_) => ErrorCode::AIProviderError,
        }
    }
}

/// Result of a completed turn.
#[derive(Debug, Clone)]
pub struct TurnResult {
    pub outcome: TurnOutcome,
    /// The committed assistant text.
    pub reply: String,
    /// Suggestions now stored on the session.
    pub suggestions: Vec<String>,
    pub usage: Option<TokenUsage>,
}

/// Owns the per-turn decision logic around the gateway.
#[derive(Clone)]
pub struct DialogueController {
    provider: Arc<dyn AIProvider>,
    suggestions: SuggestionGenerator,
    detector: Arc<dyn ReportDetector>,
    settings: DialogueSettings,
}

impl DialogueController {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        suggestions: SuggestionGenerator,
        detector: Arc<dyn ReportDetector>,
        settings: DialogueSettings,
    ) -> Self {
        Self {
            provider,
            suggestions,
            detector,
            settings,
        }
    }

    pub fn settings(&self) -> &DialogueSettings {
        &self.settings
    }

    /// Records a user message and produces the reply.
    pub async fn submit(
        &self,
        session: &mut Session,
        text: &str,
        sink: Option<&DisplaySink>,
    ) -> Result<TurnResult, DialogueError> {
        session.submit(text)?;
        tracing::info!(
            session_id = %session.id(),
            stage = ?session.stage(),
            turn_count = session.turn_count(),
            "User turn recorded"
        );
        self.respond(session, sink).await
    }

    /// Requests the report now and produces it.
    pub async fn finish(
        &self,
        session: &mut Session,
        sink: Option<&DisplaySink>,
    ) -> Result<TurnResult, DialogueError> {
        session.finish()?;
        tracing::info!(
            session_id = %session.id(),
            turn_count = session.turn_count(),
            "Report requested"
        );
        self.respond(session, sink).await
    }

    /// Produces the reply owed to the latest user-side message.
    ///
    /// Calling this again after a failure retries the same turn.
    pub async fn respond(
        &self,
        session: &mut Session,
        sink: Option<&DisplaySink>,
    ) -> Result<TurnResult, DialogueError> {
        session.ensure_pending()?;
        let session_id = *session.id();

        let request = CompletionRequest::new(RequestMetadata::for_session(
            session_id,
            RequestPurpose::Dialogue,
        ))
        .with_messages(session.gateway_messages())
        .with_temperature(self.settings.temperature);

        tracing::debug!(
            session_id = %session_id,
            report_turn = session.is_report_turn(),
            messages = request.messages.len(),
            stream = self.settings.stream,
            "Calling completion gateway"
        );

        let reply = match timeout(self.settings.response_timeout, self.call_gateway(request, sink))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(AIError::timeout(self.settings.response_timeout.as_secs() as u32)),
        };

        let (text, usage) = match reply {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(
                    session_id = %session_id,
                    stage = ?session.stage(),
                    turn_count = session.turn_count(),
                    error = %err,
                    "Dialogue turn failed"
                );
                session.record_failure(&failure_notice(&err))?;
                return Err(DialogueError::Gateway(err));
            }
        };

        let outcome = session.commit_response(&text, self.detector.as_ref())?;
        if outcome.report_ready {
            tracing::info!(
                session_id = %session_id,
                turn_count = session.turn_count(),
                "Consultation report produced"
            );
        }

        let suggestions = if outcome.wants_suggestions {
            let options = self.suggestions.generate(session_id, &text).await;
            if session.set_suggestions(options.clone()) {
                options
            } else {
                Vec::new()
            }
        } else {
            Vec::new()
        };

        Ok(TurnResult {
            outcome,
            reply: text,
            suggestions,
            usage,
        })
    }

    /// Collects the complete reply, relaying increments to `sink`.
    async fn call_gateway(
        &self,
        request: CompletionRequest,
        sink: Option<&DisplaySink>,
    ) -> Result<(String, Option<TokenUsage>), AIError> {
        if !self.settings.stream {
            let response = self.provider.complete(request).await?;
            ensure_finished(response.finish_reason)?;
            if response.content.trim().is_empty() {
                return Err(AIError::EmptyResponse);
            }
            if let Some(sink) = sink {
                let _ = sink.send(response.content.clone()).await;
            }
            return Ok((response.content, Some(response.usage)));
        }

        let mut stream = self.provider.stream_complete(request).await?;
        let mut full_content = String::new();
        let mut usage = None;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if !chunk.delta.is_empty() {
                full_content.push_str(&chunk.delta);
                if let Some(sink) = sink {
                    // A vanished viewer does not abort the turn
                    let _ = sink.send(chunk.delta).await;
                }
            }
            if let Some(reason) = chunk.finish_reason {
                ensure_finished(reason)?;
                usage = chunk.usage;
                break;
            }
        }

        if full_content.trim().is_empty() {
            return Err(AIError::EmptyResponse);
        }
        Ok((full_content, usage))
    }
}

/// Only a natural stop or a length cut counts as a finished reply.
fn ensure_finished(reason: FinishReason) -> Result<(), AIError> {
    match reason {
        FinishReason::Stop | FinishReason::Length => Ok(()),
        FinishReason::ContentFilter => Err(AIError::content_filtered(
            "reply withheld by the provider's content filter",
        )),
        FinishReason::Error => Err(AIError::network("reply ended with a provider error")),
    }
}

fn failure_notice(err: &AIError) -> String {
    format!(
        "⚠️ The assistant could not answer ({}). Your message was kept; retry to ask again.",
        err
    )
}
