//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("{0} still holds a placeholder value")]
    PlaceholderCredential(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid socket address: {0}")]
    InvalidSocketAddress(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid AI base URL: must start with http:// or https://")]
    InvalidBaseUrl,

    #[error("Invalid {0} temperature: must be between 0.0 and 2.0")]
    InvalidTemperature(&'static str),

    #[error("Invalid max turns: must be at least 1")]
    InvalidTurnLimit,

    #[error("Invalid response timeout: must be at least 1 second")]
    InvalidResponseTimeout,

    #[error("Response timeout ({response_secs}s) must be shorter than request timeout ({request_secs}s)")]
    ResponseTimeoutTooLong { response_secs: u64, request_secs: u64 },

    #[error("AI gateway timeout ({gateway_secs}s) must cover the response timeout ({response_secs}s)")]
    GatewayTimeoutTooShort { gateway_secs: u64, response_secs: u64 },
}
