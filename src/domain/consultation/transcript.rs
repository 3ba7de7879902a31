//! Ordered, append-only message log of a consultation.

use serde::Serialize;

use super::message::{Message, MessageKind, Role};
use crate::domain::foundation::ValidationError;

/// The transcript exchanged with the completion gateway.
///
/// # Invariants
///
/// - The first entry is always the configuration message
/// - Entries are only appended; the whole transcript is replaced on reset
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Creates a transcript holding the configuration prompt and greeting.
    pub fn opening(
        configuration: impl Into<String>,
        greeting: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            messages: vec![
                Message::configuration(configuration)?,
                Message::assistant(greeting)?,
            ],
        })
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// All entries in order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The configuration message.
    pub fn configuration(&self) -> Option<&Message> {
        self.messages
            .first()
            .filter(|m| m.kind() == MessageKind::Configuration)
    }

    /// The most recent entry of any kind.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The most recent entry the gateway would see.
    pub fn last_gateway_facing(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.kind().gateway_role().is_some())
    }

    /// The most recent user or control-signal entry.
    pub fn last_user_side(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.kind().is_user_side())
    }

    /// The most recent model output.
    pub fn last_assistant(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_assistant())
    }

    /// Role-tagged text in the shape the gateway understands.
    ///
    /// Control signals appear as plain user text; notices are omitted.
    pub fn gateway_messages(&self) -> impl Iterator<Item = (Role, &str)> + '_ {
        self.messages
            .iter()
            .filter_map(|m| m.kind().gateway_role().map(|role| (role, m.content())))
    }

    /// Entries suitable for display.
    ///
    /// Drops the configuration, control signals, and anything whose text is
    /// exactly the termination signal, even if a user typed it.
    pub fn rendered<'a>(&'a self, termination_signal: &'a str) -> impl Iterator<Item = &'a Message> + 'a {
        self.messages
            .iter()
            .filter(move |m| m.kind().is_rendered() && m.content() != termination_signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNAL: &str = "I have finished describing. Please write the report.";

    fn transcript() -> Transcript {
        Transcript::opening("You are an interviewer.", "Hello, how are you feeling?").unwrap()
    }

    #[test]
    fn opening_holds_configuration_then_greeting() {
        let t = transcript();
        assert_eq!(t.len(), 2);
        assert_eq!(t.messages()[0].kind(), MessageKind::Configuration);
        assert!(t.messages()[1].is_assistant());
        assert!(t.configuration().is_some());
    }

    #[test]
    fn gateway_view_keeps_signal_and_drops_notices() {
        let mut t = transcript();
        t.push(Message::user("I feel cold").unwrap());
        t.push(Message::control_signal(SIGNAL).unwrap());
        t.push(Message::notice("The assistant could not answer.").unwrap());

        let roles: Vec<_> = t.gateway_messages().map(|(role, _)| role).collect();
        assert_eq!(roles, vec![Role::System, Role::Assistant, Role::User, Role::User]);
        assert_eq!(t.gateway_messages().last().unwrap().1, SIGNAL);
    }

    #[test]
    fn rendered_view_hides_configuration_and_signal() {
        let mut t = transcript();
        t.push(Message::user("I feel cold").unwrap());
        t.push(Message::control_signal(SIGNAL).unwrap());

        let rendered: Vec<_> = t.rendered(SIGNAL).map(|m| m.content().to_string()).collect();
        assert_eq!(rendered, vec!["Hello, how are you feeling?", "I feel cold"]);
    }

    #[test]
    fn rendered_view_hides_typed_signal_text() {
        let mut t = transcript();
        t.push(Message::user(SIGNAL).unwrap());
        assert_eq!(t.rendered(SIGNAL).count(), 1);
    }

    #[test]
    fn last_gateway_facing_skips_notices() {
        let mut t = transcript();
        t.push(Message::user("hi").unwrap());
        t.push(Message::notice("failed").unwrap());
        assert_eq!(t.last().unwrap().kind(), MessageKind::Notice);
        assert_eq!(t.last_gateway_facing().unwrap().kind(), MessageKind::User);
    }

    #[test]
    fn last_assistant_finds_latest_output() {
        let mut t = transcript();
        t.push(Message::user("hi").unwrap());
        t.push(Message::assistant("second").unwrap());
        assert_eq!(t.last_assistant().unwrap().content(), "second");
    }
}
