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

    #[error("Invalid storage key namespace")]
    InvalidStorageNamespace,

    #[error("Invalid price endpoint URL")]
    InvalidPriceEndpoint,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid interval: {0} must be greater than zero")]
    InvalidInterval(&'static str),

    #[error("Invalid log filter directive")]
    InvalidLogFilter,
}
