//! Mock AI Provider for testing.
//!
//! Provides a configurable mock implementation of the AIProvider port,
//! allowing tests to run without calling a real completion service.
//!
//! # Features
//!
//! - Pre-configured responses, consumed in order
//! - Simulated delays for timeout and single-flight testing
//! - Error injection, including streams that break part-way
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_response("How long have you slept poorly?")
//!     .with_delay(Duration::from_millis(100));
//!
//! let response = provider.complete(request).await?;
//! assert_eq!(response.content, "How long have you slept poorly?");
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, CompletionStream, FinishReason,
    ProviderInfo, RequestPurpose, StreamChunk, TokenUsage,
};

/// Mock AI provider for testing.
///
/// Configurable to return specific responses, simulate delays, or inject errors.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Provider info to return.
    info: ProviderInfo,
    /// Simulated latency per request.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a successful completion.
    Success {
        content: String,
        usage: TokenUsage,
        finish_reason: FinishReason,
    },
    /// Return an error before any output.
    Error(MockError),
    /// Stream `partial`, then fail. Atomic calls fail outright.
    BrokenStream { partial: String, error: MockError },
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    /// Simulate rate limiting.
    RateLimited { retry_after_secs: u32 },
    /// Simulate content filtering.
    ContentFiltered { reason: String },
    /// Simulate provider unavailable.
    Unavailable { message: String },
    /// Simulate authentication failure.
    AuthenticationFailed,
    /// Simulate network error.
    Network { message: String },
    /// Simulate a malformed payload.
    Parse { message: String },
    /// Simulate timeout.
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::ContentFiltered { reason } => AIError::content_filtered(reason),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Parse { message } => AIError::parse(message),
            MockError::Timeout { timeout_secs } => AIError::timeout(timeout_secs),
        }
    }
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockAIProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1").with_streaming(true),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.with_response_full(content, TokenUsage::new(10, 20), FinishReason::Stop)
    }

    /// Adds a successful response with full configuration.
    pub fn with_response_full(
        self,
        content: impl Into<String>,
        usage: TokenUsage,
        finish_reason: FinishReason,
    ) -> Self {
        self.push(MockResponse::Success {
            content: content.into(),
            usage,
            finish_reason,
        })
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: MockError) -> Self {
        self.push(MockResponse::Error(error))
    }

    /// Adds a stream that yields `partial` and then fails with `error`.
    pub fn with_broken_stream(self, partial: impl Into<String>, error: MockError) -> Self {
        self.push(MockResponse::BrokenStream {
            partial: partial.into(),
            error,
        })
    }

    /// Queues another response on a shared provider.
    pub fn push_response(&self, response: MockResponse) {
        lock(&self.responses).push_back(response);
    }

    fn push(self, response: MockResponse) -> Self {
        self.push_response(response);
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the provider info.
    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns the number of calls made for one purpose.
    pub fn call_count_for(&self, purpose: RequestPurpose) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.metadata.purpose == purpose)
            .count()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        lock(&self.calls).clone()
    }

    /// Returns the most recent call, if any.
    pub fn last_call(&self) -> Option<CompletionRequest> {
        lock(&self.calls).last().cloned()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    /// Gets the next response or a default.
    fn next_response(&self) -> MockResponse {
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success {
                content: "Mock response".to_string(),
                usage: TokenUsage::new(5, 10),
                finish_reason: FinishReason::Stop,
            })
    }

    async fn record(&self, request: CompletionRequest) {
        lock(&self.calls).push(request);
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}

/// Splits text into word-sized increments whose concatenation is the input.
fn word_chunks(content: &str) -> Vec<Result<StreamChunk, AIError>> {
    content
        .split_inclusive(' ')
        .map(|s| Ok(StreamChunk::content(s)))
        .collect()
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        self.record(request).await;

        match self.next_response() {
            MockResponse::Success {
                content,
                usage,
                finish_reason,
            } => Ok(CompletionResponse {
                content,
                usage,
                model: self.info.model.clone(),
                finish_reason,
            }),
            MockResponse::Error(err) | MockResponse::BrokenStream { error: err, .. } => {
                Err(err.into())
            }
        }
    }

    async fn stream_complete(&self, request: CompletionRequest) -> Result<CompletionStream, AIError> {
        self.record(request).await;

        match self.next_response() {
            MockResponse::Success {
                content,
                usage,
                finish_reason,
            } => {
                let final_chunk = stream::once(async move {
                    Ok(StreamChunk::final_chunk(finish_reason, usage))
                });
                Ok(Box::pin(stream::iter(word_chunks(&content)).chain(final_chunk)))
            }
            MockResponse::Error(err) => Err(err.into()),
            MockResponse::BrokenStream { partial, error } => {
                let failure = stream::once(async move { Err(AIError::from(error)) });
                Ok(Box::pin(stream::iter(word_chunks(&partial)).chain(failure)))
            }
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MessageRole, RequestMetadata};

    fn test_request() -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::detached(RequestPurpose::Dialogue))
            .with_message(MessageRole::User, "Hello")
    }

    async fn collect(mut stream: CompletionStream) -> (String, Option<AIError>, bool) {
        let mut content = String::new();
        let mut saw_final = false;
        while let Some(result) = stream.next().await {
            match result {
                Ok(chunk) => {
                    content.push_str(&chunk.delta);
                    saw_final |= chunk.is_final();
                }
                Err(err) => return (content, Some(err), saw_final),
            }
        }
        (content, None, saw_final)
    }

    #[tokio::test]
    async fn mock_provider_returns_responses_in_order() {
        let provider = MockAIProvider::new().with_response("First").with_response("Second");

        let r1 = provider.complete(test_request()).await.unwrap();
        let r2 = provider.complete(test_request()).await.unwrap();
        let r3 = provider.complete(test_request()).await.unwrap();

        assert_eq!(r1.content, "First");
        assert_eq!(r2.content, "Second");
        assert_eq!(r3.content, "Mock response");
        assert_eq!(r1.model, "mock-model-1");
    }

    #[tokio::test]
    async fn mock_provider_returns_configured_error() {
        let provider =
            MockAIProvider::new().with_error(MockError::RateLimited { retry_after_secs: 30 });

        let err = provider.complete(test_request()).await.unwrap_err();
        assert!(matches!(err, AIError::RateLimited { retry_after_secs: 30 }));
    }

    #[tokio::test]
    async fn mock_provider_tracks_calls_by_purpose() {
        let provider = MockAIProvider::new();
        provider.complete(test_request()).await.unwrap();
        provider
            .complete(CompletionRequest::new(RequestMetadata::detached(
                RequestPurpose::HealthTip,
            )))
            .await
            .unwrap();

        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.call_count_for(RequestPurpose::HealthTip), 1);
        assert_eq!(
            provider.last_call().map(|c| c.metadata.purpose),
            Some(RequestPurpose::HealthTip)
        );

        provider.clear_calls();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn streaming_reassembles_exact_text() {
        let text = "### Report\n\nLine one  with  spaces.\n";
        let provider = MockAIProvider::new().with_response(text);

        let stream = provider.stream_complete(test_request()).await.unwrap();
        let (content, error, saw_final) = collect(stream).await;

        assert_eq!(content, text);
        assert!(error.is_none());
        assert!(saw_final);
    }

    #[tokio::test]
    async fn broken_stream_yields_partial_then_error() {
        let provider = MockAIProvider::new().with_broken_stream(
            "Half an answer",
            MockError::Network {
                message: "reset".into(),
            },
        );

        let stream = provider.stream_complete(test_request()).await.unwrap();
        let (content, error, saw_final) = collect(stream).await;

        assert_eq!(content, "Half an answer");
        assert!(matches!(error, Some(AIError::Network(_))));
        assert!(!saw_final);
    }

    #[tokio::test]
    async fn streaming_error_fails_before_stream() {
        let provider = MockAIProvider::new().with_error(MockError::Unavailable {
            message: "Service down".to_string(),
        });

        assert!(matches!(
            provider.stream_complete(test_request()).await,
            Err(AIError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn mock_provider_respects_delay() {
        let provider = MockAIProvider::new()
            .with_response("Delayed response")
            .with_delay(Duration::from_millis(50));

        let start = std::time::Instant::now();
        provider.complete(test_request()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn mock_error_converts_to_ai_error() {
        let err: AIError = MockError::AuthenticationFailed.into();
        assert!(matches!(err, AIError::AuthenticationFailed));

        let err: AIError = MockError::Timeout { timeout_secs: 30 }.into();
        assert!(matches!(err, AIError::Timeout { timeout_secs: 30 }));
    }
}
