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
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid socket address: {0}")]
    InvalidSocketAddr(String),

    #[error("Temperature must be between 0.0 and 2.0")]
    InvalidTemperature,

    #[error("max_tokens must be greater than zero")]
    InvalidMaxTokens,

    #[error("Confidence threshold must be between 0.0 and 1.0")]
    InvalidConfidenceThreshold,

    #[error("Turn history limit must allow at least one full turn")]
    InvalidHistoryLimit,

    #[error("Consecutive unknown limit must be at least 1")]
    InvalidUnknownLimit,

    #[error("Generation must be attempted at least once")]
    InvalidRetryAttempts,

    #[error("Collaborator timeout must be greater than zero")]
    InvalidCollaboratorTimeout,
}
