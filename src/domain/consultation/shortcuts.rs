//! Canned one-click actions offered next to the transcript.

use serde::{Deserialize, Serialize};

/// Stable id of the "done describing" action.
pub const FINISH_SHORTCUT_ID: &str = "finish";

/// Prefix for ids of model-generated reply suggestions.
pub const SUGGESTION_SHORTCUT_PREFIX: &str = "suggestion-";

/// A pre-written user intent from the static catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CannedPrompt {
    /// Stable identifier used by clients.
    pub id: String,
    /// Short button label.
    pub label: String,
    /// Text submitted verbatim as the user's turn.
    pub text: String,
}

impl CannedPrompt {
    pub fn new(id: impl Into<String>, label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            text: text.into(),
        }
    }
}

/// What pressing a shortcut does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum ShortcutAction {
    /// Submit the text as if the user typed it.
    Submit(String),
    /// Request the report now.
    Finish,
}

/// A shortcut currently available for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    pub id: String,
    pub label: String,
    pub action: ShortcutAction,
}

impl Shortcut {
    /// Shortcut that submits a catalog prompt.
    pub fn from_prompt(prompt: &CannedPrompt) -> Self {
        Self {
            id: prompt.id.clone(),
            label: prompt.label.clone(),
            action: ShortcutAction::Submit(prompt.text.clone()),
        }
    }

    /// Shortcut for the `index`-th reply suggestion.
    pub fn suggestion(index: usize, text: &str) -> Self {
        Self {
            id: format!("{}{}", SUGGESTION_SHORTCUT_PREFIX, index),
            label: text.to_string(),
            action: ShortcutAction::Submit(text.to_string()),
        }
    }

    /// The explicit early-exit action.
    pub fn finish(label: impl Into<String>) -> Self {
        Self {
            id: FINISH_SHORTCUT_ID.to_string(),
            label: label.into(),
            action: ShortcutAction::Finish,
        }
    }
}
