//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Chat-completion gateways (OpenAI-compatible, mock)
//! - `storage` - Session stores
//! - `http` - REST and WebSocket API

pub mod ai;
pub mod http;
pub mod storage;

pub use ai::{MockAIProvider, OpenAIConfig, OpenAIProvider};
pub use storage::InMemorySessionStore;
