//! Message entity for consultation transcripts.
//!
//! Messages are immutable records. The `MessageKind` tag separates genuine
//! dialogue from control traffic, so "is this a real user turn" is answered
//! by the type rather than by comparing strings.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, Timestamp, ValidationError};

/// Role a message takes when sent to the completion gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// System instructions.
    System,
    /// User input.
    User,
    /// Model response.
    Assistant,
}

/// What a transcript entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// The interviewer configuration prompt. Always first, never shown.
    Configuration,
    /// Text produced by the model.
    Assistant,
    /// A turn authored by the user (typed or picked from a shortcut).
    User,
    /// Synthetic "I have finished describing" request.
    ///
    /// Sent to the gateway as plain user text but never rendered.
    ControlSignal,
    /// A visible error note about a failed turn. Never sent to the gateway.
    Notice,
}

impl MessageKind {
    /// Returns the gateway role, or `None` for entries the gateway never sees.
    pub fn gateway_role(&self) -> Option<Role> {
        match self {
            Self::Configuration => Some(Role::System),
            Self::Assistant => Some(Role::Assistant),
            Self::User | Self::ControlSignal => Some(Role::User),
            Self::Notice => None,
        }
    }

    /// Returns true if the entry belongs in a user-facing view.
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Assistant | Self::User | Self::Notice)
    }

    /// Returns true for entries occupying the user side of the dialogue.
    pub fn is_user_side(&self) -> bool {
        matches!(self, Self::User | Self::ControlSignal)
    }
}

/// An immutable message within a transcript.
///
/// # Invariants
///
/// - `id` is globally unique
/// - `content` is non-empty (validated at construction)
/// - `created_at` is set at construction and never changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    kind: MessageKind,
    content: String,
    created_at: Timestamp,
}

impl Message {
    /// Creates a new message of the given kind.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if content is empty or whitespace only
    pub fn new(kind: MessageKind, content: impl Into<String>) -> Result<Self, ValidationError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(ValidationError::empty_field("content"));
        }

        Ok(Self {
            id: MessageId::new(),
            kind,
            content,
            created_at: Timestamp::now(),
        })
    }

    /// Creates the configuration message.
    pub fn configuration(content: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(MessageKind::Configuration, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(MessageKind::Assistant, content)
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(MessageKind::User, content)
    }

    /// Creates a control signal carrying the termination text.
    pub fn control_signal(signal_text: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(MessageKind::ControlSignal, signal_text)
    }

    /// Creates a failure notice.
    pub fn notice(content: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(MessageKind::Notice, content)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the message ID.
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Returns the kind tag.
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Returns the content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns when the message was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns true if this message was produced by the model.
    pub fn is_assistant(&self) -> bool {
        self.kind == MessageKind::Assistant
    }

    /// Returns true if this is a control signal.
    pub fn is_control_signal(&self) -> bool {
        self.kind == MessageKind::ControlSignal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod kind {
        use super::*;

        #[test]
        fn control_signal_goes_to_gateway_as_user() {
            assert_eq!(MessageKind::ControlSignal.gateway_role(), Some(Role::User));
        }

        #[test]
        fn configuration_goes_to_gateway_as_system() {
            assert_eq!(MessageKind::Configuration.gateway_role(), Some(Role::System));
        }

        #[test]
        fn notice_never_reaches_gateway() {
            assert_eq!(MessageKind::Notice.gateway_role(), None);
        }

        #[test]
        fn only_dialogue_and_notices_are_rendered() {
            assert!(MessageKind::User.is_rendered());
            assert!(MessageKind::Assistant.is_rendered());
            assert!(MessageKind::Notice.is_rendered());
            assert!(!MessageKind::Configuration.is_rendered());
            assert!(!MessageKind::ControlSignal.is_rendered());
        }

        #[test]
        fn user_side_covers_user_and_signal() {
            assert!(MessageKind::User.is_user_side());
            assert!(MessageKind::ControlSignal.is_user_side());
            assert!(!MessageKind::Assistant.is_user_side());
            assert!(!MessageKind::Notice.is_user_side());
        }

        #[test]
        fn serializes_to_snake_case() {
            let json = serde_json::to_string(&MessageKind::ControlSignal).unwrap();
            assert_eq!(json, "\"control_signal\"");
        }
    }

    mod construction {
        use super::*;

        #[test]
        fn user_creates_user_message() {
            let msg = Message::user("I sleep badly").unwrap();
            assert_eq!(msg.kind(), MessageKind::User);
            assert_eq!(msg.content(), "I sleep badly");
            assert!(!msg.is_assistant());
        }

        #[test]
        fn assistant_creates_assistant_message() {
            let msg = Message::assistant("How long has this lasted?").unwrap();
            assert!(msg.is_assistant());
        }

        #[test]
        fn control_signal_is_tagged() {
            let msg = Message::control_signal("done").unwrap();
            assert!(msg.is_control_signal());
        }

        #[test]
        fn rejects_empty_content() {
            assert!(Message::new(MessageKind::User, "").is_err());
        }

        #[test]
        fn rejects_whitespace_only_content() {
            assert!(Message::assistant("  \n ").is_err());
        }
    }
}
