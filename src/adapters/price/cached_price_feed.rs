//! Cached Price Feed
//!
//! Response cache in front of another feed. A quote younger than the TTL is
//! served without touching the inner feed; when the inner feed fails the last
//! good quote is served marked `stale`.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::ports::{PriceFeed, PriceFeedError, PriceQuote};

/// Default freshness window.
pub const DEFAULT_PRICE_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CachedQuote {
    quote: PriceQuote,
    fetched_at: Instant,
}

/// `PriceFeed` decorator with a fixed TTL.
pub struct CachedPriceFeed {
    inner: Arc<dyn PriceFeed>,
    ttl: Duration,
    cached: RwLock<Option<CachedQuote>>,
}

impl CachedPriceFeed {
    pub fn new(inner: Arc<dyn PriceFeed>) -> Self {
        Self::with_ttl(inner, DEFAULT_PRICE_TTL)
    }

    pub fn with_ttl(inner: Arc<dyn PriceFeed>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cached: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drops the cached quote.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }
}

#[async_trait]
impl PriceFeed for CachedPriceFeed {
    async fn latest(&self) -> Result<PriceQuote, PriceFeedError> {
        if let Some(entry) = self.cached.read().await.as_ref() {
            if entry.fetched_at.elapsed() < self.ttl {
                return Ok(entry.quote.clone());
            }
        }

        match self.inner.latest().await {
            Ok(quote) => {
                *self.cached.write().await = Some(CachedQuote {
                    quote: quote.clone(),
                    fetched_at: Instant::now(),
                });
                Ok(quote)
            }
            Err(e) => match self.cached.read().await.as_ref() {
                Some(entry) => {
                    tracing::warn!(
                        error = %e,
                        error_code = ?e.code(),
                        "Price refresh failed, serving stale quote"
                    );
                    Ok(entry.quote.clone().into_stale())
                }
                None => Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::price::MockPriceFeed;
    use crate::domain::foundation::Timestamp;

    fn quote(value: f64) -> PriceQuote {
        PriceQuote::new(value, "test", Timestamp::now())
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_quote_is_served_from_cache() {
        let inner = Arc::new(MockPriceFeed::new().with_quote(quote(100.0)).with_quote(quote(200.0)));
        let feed = CachedPriceFeed::new(inner.clone());

        assert_eq!(feed.latest().await.unwrap().value, 100.0);
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(feed.latest().await.unwrap().value, 100.0);

        assert_eq!(inner.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_quote_is_refreshed() {
        let inner = Arc::new(MockPriceFeed::new().with_quote(quote(100.0)).with_quote(quote(200.0)));
        let feed = CachedPriceFeed::new(inner.clone());

        feed.latest().await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(feed.latest().await.unwrap().value, 200.0);
        assert_eq!(inner.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_serves_stale_quote() {
        let inner = Arc::new(
            MockPriceFeed::new()
                .with_quote(quote(100.0))
                .with_error(PriceFeedError::Upstream("price_fetch_failed".into())),
        );
        let feed = CachedPriceFeed::with_ttl(inner, Duration::from_secs(1));

        feed.latest().await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;

        let stale = feed.latest().await.unwrap();
        assert_eq!(stale.value, 100.0);
        assert!(stale.stale);
    }

    #[tokio::test]
    async fn failure_without_cache_propagates() {
        let inner = Arc::new(
            MockPriceFeed::new().with_error(PriceFeedError::Network("down".into())),
        );
        let feed = CachedPriceFeed::new(inner);

        assert_eq!(
            feed.latest().await.unwrap_err(),
            PriceFeedError::Network("down".into())
        );
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let inner = Arc::new(MockPriceFeed::new().with_quote(quote(1.0)).with_quote(quote(2.0)));
        let feed = CachedPriceFeed::new(inner);

        feed.latest().await.unwrap();
        feed.invalidate().await;

        assert_eq!(feed.latest().await.unwrap().value, 2.0);
    }
}
