//! Price lookup configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Price feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PriceConfig {
    /// Price endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// How long a fetched quote is served from cache
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Client refresh interval
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl PriceConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate price configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ValidationError::InvalidPriceEndpoint);
        }
        if self.cache_ttl_secs == 0 {
            return Err(ValidationError::InvalidInterval("price.cache_ttl_secs"));
        }
        if self.poll_interval_secs == 0 {
            return Err(ValidationError::InvalidInterval("price.poll_interval_secs"));
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            cache_ttl_secs: default_cache_ttl(),
            poll_interval_secs: default_poll_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:3000/api/btc-price".to_string()
}

fn default_cache_ttl() -> u64 {
    60
}

fn default_poll_interval() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    10
}
