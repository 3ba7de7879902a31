//! AI gateway configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Values that mean "nobody filled this in".
const PLACEHOLDER_KEYS: &[&str] = &["your_key", "your-api-key", "your_api_key", "changeme", "xxx"];

/// AI gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// API key for the chat-completions endpoint
    pub api_key: Option<Secret<String>>,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Temperature for dialogue turns
    #[serde(default = "default_dialogue_temperature")]
    pub dialogue_temperature: f32,

    /// Temperature for reply suggestions
    #[serde(default = "default_suggestion_temperature")]
    pub suggestion_temperature: f32,

    /// Temperature for wellness tips
    #[serde(default = "default_tip_temperature")]
    pub tip_temperature: f32,

    /// Stream dialogue replies
    #[serde(default = "default_stream")]
    pub stream: bool,

    /// HTTP timeout per non-streaming gateway request in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Bound on suggestion and tip calls in seconds
    #[serde(default = "default_side_call_timeout")]
    pub side_call_timeout_secs: u64,

    /// Maximum retries on transient failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn side_call_timeout(&self) -> Duration {
        Duration::from_secs(self.side_call_timeout_secs)
    }

    /// The API key, if configured and non-blank
    pub fn api_key(&self) -> Option<&Secret<String>> {
        self.api_key
            .as_ref()
            .filter(|k| !k.expose_secret().trim().is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let key = self
            .api_key()
            .ok_or(ValidationError::MissingRequired("GUIDED_CONSULT__AI__API_KEY"))?;
        let lowered = key.expose_secret().trim().to_lowercase();
        if PLACEHOLDER_KEYS.contains(&lowered.as_str()) {
            return Err(ValidationError::PlaceholderCredential(
                "GUIDED_CONSULT__AI__API_KEY",
            ));
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ValidationError::InvalidBaseUrl);
        }

        for (name, value) in [
            ("dialogue", self.dialogue_temperature),
            ("suggestion", self.suggestion_temperature),
            ("tip", self.tip_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(ValidationError::InvalidTemperature(name));
            }
        }

        if self.timeout_secs == 0 || self.side_call_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            dialogue_temperature: default_dialogue_temperature(),
            suggestion_temperature: default_suggestion_temperature(),
            tip_temperature: default_tip_temperature(),
            stream: default_stream(),
            timeout_secs: default_timeout(),
            side_call_timeout_secs: default_side_call_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_base_url() -> String {
    "https://open.bigmodel.cn/api/paas/v4".to_string()
}

fn default_model() -> String {
    "glm-4".to_string()
}

fn default_dialogue_temperature() -> f32 {
    0.8
}

fn default_suggestion_temperature() -> f32 {
    0.5
}

fn default_tip_temperature() -> f32 {
    0.9
}

fn default_stream() -> bool {
    true
}

fn default_timeout() -> u64 {
    240
}

fn default_side_call_timeout() -> u64 {
    15
}

fn default_retries() -> u32 {
    2
}
