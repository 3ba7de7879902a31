//! Interview policy configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::consultation::TurnLimit;

/// Interview policy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InterviewConfig {
    /// Cap on interview turns; absent means the model decides when to stop
    pub max_turns: Option<u32>,

    /// Bound on one dialogue reply, streaming included, in seconds
    #[serde(default = "default_response_timeout")]
    pub response_timeout_secs: u64,

    /// Extra accepted report headings (comma-separated)
    pub report_headers: Option<String>,
}

impl InterviewConfig {
    /// The configured turn cap
    pub fn turn_limit(&self) -> Result<TurnLimit, ValidationError> {
        TurnLimit::from_config(self.max_turns).map_err(|_| ValidationError::InvalidTurnLimit)
    }

    /// Get the response timeout as Duration
    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_secs)
    }

    /// Extra report headings as a vector
    pub fn report_headers_list(&self) -> Vec<String> {
        self.report_headers
            .as_ref()
            .map(|s| {
                s.split(',')
                    .map(|h| h.trim().to_string())
                    .filter(|h| !h.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Validate interview configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.turn_limit()?;
        if self.response_timeout_secs == 0 {
            return Err(ValidationError::InvalidResponseTimeout);
        }
        Ok(())
    }
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            max_turns: None,
            response_timeout_secs: default_response_timeout(),
            report_headers: None,
        }
    }
}

fn default_response_timeout() -> u64 {
    180
}
