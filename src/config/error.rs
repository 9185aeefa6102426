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
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid socket address: {0}")]
    InvalidSocketAddr(String),

    #[error("Invalid log format: {0} (expected json or pretty)")]
    InvalidLogFormat(String),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Connect timeout must be between 1 and 300 seconds")]
    InvalidConnectTimeout,

    #[error("Offer validity must be between 1 and 365 days")]
    InvalidOfferValidity,

    #[error("Default currency must be a three-letter code")]
    InvalidCurrency,
}
