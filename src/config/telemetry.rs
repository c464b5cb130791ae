//! Logging configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Rust log filter directive (overridden by `RUST_LOG`)
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl TelemetryConfig {
    /// Validate telemetry configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.log_filter.trim().is_empty() {
            return Err(ValidationError::InvalidLogFilter);
        }
        tracing_subscriber::EnvFilter::try_new(&self.log_filter)
            .map_err(|_| ValidationError::InvalidLogFilter)?;
        Ok(())
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_log_filter() -> String {
    "info,odd_experiments=debug".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telemetry_defaults() {
        let config = TelemetryConfig::default();
        assert_eq!(config.log_filter, "info,odd_experiments=debug");
        assert!(!config.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_telemetry_rejects_empty_filter() {
        let config = TelemetryConfig {
            log_filter: "  ".to_string(),
            json: false,
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidLogFilter));
    }
}
