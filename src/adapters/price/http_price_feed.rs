//! HTTP Price Feed Adapter
//!
//! Fetches the latest price from a JSON endpoint. The endpoint answers with
//! an envelope:
//!
//! ```json
//! { "ok": true, "value": 67000.5, "source": "coingecko", "timestamp": 1718000000000 }
//! { "ok": false, "error": "price_fetch_failed" }
//! ```
//!
//! `btcUsd` and `ts` are accepted as field aliases.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::domain::foundation::Timestamp;
use crate::ports::{PriceFeed, PriceFeedError, PriceQuote};

/// Configuration for the HTTP price feed.
#[derive(Debug, Clone)]
pub struct HttpPriceFeedConfig {
    /// Full URL of the price endpoint.
    pub endpoint: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl HttpPriceFeedConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// `PriceFeed` over HTTP.
pub struct HttpPriceFeed {
    config: HttpPriceFeedConfig,
    client: Client,
}

impl HttpPriceFeed {
    /// Creates a feed with its own HTTP client.
    pub fn new(config: HttpPriceFeedConfig) -> Result<Self, PriceFeedError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PriceFeedError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

#[async_trait]
impl PriceFeed for HttpPriceFeed {
    async fn latest(&self) -> Result<PriceQuote, PriceFeedError> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PriceFeedError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    PriceFeedError::Network(format!("Connection failed: {}", e))
                } else {
                    PriceFeedError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PriceFeedError::Network(format!("Failed to read body: {}", e)))?;

        match parse_price_envelope(&body) {
            Ok(quote) if status.is_success() => Ok(quote),
            Ok(_) => Err(PriceFeedError::Upstream(format!("status {}", status))),
            Err(PriceFeedError::InvalidResponse(_)) if !status.is_success() => {
                Err(PriceFeedError::Upstream(format!("status {}", status)))
            }
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PriceEnvelope {
    ok: bool,
    #[serde(default, alias = "btcUsd")]
    value: Option<f64>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default, alias = "ts")]
    timestamp: Option<i64>,
    #[serde(default)]
    error: Option<String>,
}

/// Parses a price envelope body into a quote.
///
/// `ok: false` is an `Upstream` failure; a missing, non-finite or
/// non-positive value is an `InvalidResponse`.
pub fn parse_price_envelope(body: &str) -> Result<PriceQuote, PriceFeedError> {
    let envelope: PriceEnvelope = serde_json::from_str(body)
        .map_err(|e| PriceFeedError::InvalidResponse(format!("Failed to parse body: {}", e)))?;

    if !envelope.ok {
        return Err(PriceFeedError::Upstream(
            envelope.error.unwrap_or_else(|| "unknown_error".to_string()),
        ));
    }

    let value = envelope
        .value
        .ok_or_else(|| PriceFeedError::InvalidResponse("missing value".to_string()))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(PriceFeedError::InvalidResponse(format!(
            "invalid price {}",
            value
        )));
    }

    let observed_at = envelope
        .timestamp
        .and_then(Timestamp::from_unix_millis)
        .unwrap_or_else(Timestamp::now);

    Ok(PriceQuote::new(
        value,
        envelope.source.unwrap_or_else(|| "unknown".to_string()),
        observed_at,
    ))
}
