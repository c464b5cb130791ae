//! Price Feed Port - "give me the latest known price or tell me you can't".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ErrorCode, Timestamp};

/// A price observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub value: f64,
    pub source: String,
    pub observed_at: Timestamp,
    /// True when served from cache after the upstream failed.
    #[serde(default)]
    pub stale: bool,
}

impl PriceQuote {
    pub fn new(value: f64, source: impl Into<String>, observed_at: Timestamp) -> Self {
        Self {
            value,
            source: source.into(),
            observed_at,
            stale: false,
        }
    }

    pub fn into_stale(mut self) -> Self {
        self.stale = true;
        self
    }
}

/// Errors from a price lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceFeedError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },

    #[error("Upstream reported failure: {0}")]
    Upstream(String),

    #[error("Invalid price response: {0}")]
    InvalidResponse(String),
}

impl PriceFeedError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PriceFeedError::InvalidResponse(_) => ErrorCode::InvalidPriceResponse,
            _ => ErrorCode::PriceUnavailable,
        }
    }
}

/// Port for fetching the latest price.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn latest(&self) -> Result<PriceQuote, PriceFeedError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_stale_marks_quote() {
        let q = PriceQuote::new(42_000.0, "coingecko", Timestamp::now());
        assert!(!q.stale);
        assert!(q.into_stale().stale);
    }

    #[test]
    fn price_feed_error_codes() {
        assert_eq!(
            PriceFeedError::InvalidResponse("nan".into()).code(),
            ErrorCode::InvalidPriceResponse
        );
        assert_eq!(
            PriceFeedError::Timeout { timeout_secs: 5 }.code(),
            ErrorCode::PriceUnavailable
        );
    }
}
