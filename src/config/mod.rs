//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `ODD_EXPERIMENTS`
//! prefix and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use odd_experiments::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Prices from {}", config.price.endpoint);
//! ```

mod error;
mod price;
mod storage;
mod telemetry;

pub use error::{ConfigError, ValidationError};
pub use price::PriceConfig;
pub use storage::{StorageBackend, StorageConfig};
pub use telemetry::TelemetryConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment loads successfully.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Client persistence scopes
    #[serde(default)]
    pub storage: StorageConfig,

    /// Price lookup endpoint, cache and refresh loop
    #[serde(default)]
    pub price: PriceConfig,

    /// Log output
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ODD_EXPERIMENTS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ODD_EXPERIMENTS__STORAGE__BACKEND=file` -> `storage.backend = file`
    /// - `ODD_EXPERIMENTS__PRICE__POLL_INTERVAL_SECS=15` -> `price.poll_interval_secs = 15`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ODD_EXPERIMENTS")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load and validate in one step
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.storage.validate()?;
        self.price.validate()?;
        self.telemetry.validate()?;
        Ok(())
    }
}
