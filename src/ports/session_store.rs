//! Session Store Port - Interface for keeping consultation sessions alive
//! between requests.
//!
//! Each session is handed out behind its own async mutex so one request at
//! a time can drive it, while different sessions proceed independently.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::consultation::Session;
use crate::domain::foundation::SessionId;

/// A session shared between the store and in-flight requests.
pub type SharedSession = Arc<Mutex<Session>>;

/// Errors that can occur during session store operations
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Session already exists: {0}")]
    AlreadyExists(SessionId),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Port for keyed, process-lifetime session state
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a new session and return its shared handle
    ///
    /// # Errors
    /// Returns `SessionStoreError::AlreadyExists` if the id is taken
    async fn insert(&self, session: Session) -> Result<SharedSession, SessionStoreError>;

    /// Look up a session by id
    async fn get(&self, id: &SessionId) -> Result<Option<SharedSession>, SessionStoreError>;

    /// Drop a session. Returns whether it existed.
    async fn remove(&self, id: &SessionId) -> Result<bool, SessionStoreError>;

    /// Number of live sessions
    async fn count(&self) -> Result<usize, SessionStoreError>;
}
