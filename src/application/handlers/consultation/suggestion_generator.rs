//! Smart-reply suggestion generation.
//!
//! A second, small gateway call that guesses likely answers to the
//! assistant's latest question. It never fails: any problem yields the
//! default replies.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::domain::consultation::{default_suggestions, sanitize_suggestions, suggestion_prompt};
use crate::domain::foundation::SessionId;
use crate::ports::{AIProvider, CompletionRequest, MessageRole, RequestMetadata, RequestPurpose};

/// Default sampling temperature for suggestions.
pub const SUGGESTION_TEMPERATURE: f32 = 0.5;

/// Default bound on the suggestion call.
pub const SUGGESTION_TIMEOUT: Duration = Duration::from_secs(15);

/// Produces 2 to 4 one-click replies for an assistant question.
#[derive(Clone)]
pub struct SuggestionGenerator {
    provider: Arc<dyn AIProvider>,
    temperature: f32,
    timeout: Duration,
}

impl SuggestionGenerator {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            temperature: SUGGESTION_TEMPERATURE,
            timeout: SUGGESTION_TIMEOUT,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Asks the gateway for replies to `question`.
    ///
    /// The instruction is ad hoc and never enters the transcript.
    pub async fn generate(&self, session_id: SessionId, question: &str) -> Vec<String> {
        let request = CompletionRequest::new(RequestMetadata::for_session(
            session_id,
            RequestPurpose::Suggestions,
        ))
        .with_message(MessageRole::User, suggestion_prompt(question))
        .with_temperature(self.temperature);

        match timeout(self.timeout, self.provider.complete(request)).await {
            Ok(Ok(response)) => sanitize_suggestions(&response.content),
            Ok(Err(err)) => {
                tracing::warn!(
                    session_id = %session_id,
                    error = %err,
                    "Suggestion generation failed, using defaults"
                );
                default_suggestions()
            }
            Err(_) => {
                tracing::warn!(
                    session_id = %session_id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Suggestion generation timed out, using defaults"
                );
                default_suggestions()
            }
        }
    }
}
