//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `GUIDED_CONSULT` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use guided_consult::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod ai;
mod error;
mod interview;
mod server;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use interview::InterviewConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Completion gateway configuration (credential, model, temperatures)
    #[serde(default)]
    pub ai: AiConfig,

    /// Interview policy (turn cap, reply timeout, report headings)
    #[serde(default)]
    pub interview: InterviewConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `GUIDED_CONSULT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `GUIDED_CONSULT__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `GUIDED_CONSULT__AI__API_KEY=...` -> `ai.api_key = ...`
    /// - `GUIDED_CONSULT__INTERVIEW__MAX_TURNS=5` -> `interview.max_turns = 5`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GUIDED_CONSULT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// A missing or placeholder API key is an error here, so the binary
    /// refuses to start rather than failing on the first turn.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.interview.validate()?;

        if self.interview.response_timeout_secs >= self.server.request_timeout_secs {
            return Err(ValidationError::ResponseTimeoutTooLong {
                response_secs: self.interview.response_timeout_secs,
                request_secs: self.server.request_timeout_secs,
            });
        }
        if self.ai.timeout_secs < self.interview.response_timeout_secs {
            return Err(ValidationError::GatewayTimeoutTooShort {
                gateway_secs: self.ai.timeout_secs,
                response_secs: self.interview.response_timeout_secs,
            });
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
