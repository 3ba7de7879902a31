//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - Chat-completion gateway (atomic or streaming)
//! - `SessionStore` - Keyed consultation sessions

mod ai_provider;
mod session_store;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, CompletionStream, FinishReason,
    Message, MessageRole, ProviderInfo, RequestMetadata, RequestPurpose, StreamChunk, TokenUsage,
};
pub use session_store::{SessionStore, SessionStoreError, SharedSession};
