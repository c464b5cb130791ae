//! Mock Price Feed for testing.
//!
//! Replays configured results in order. Once the queue is drained the last
//! result keeps being returned.
//!
//! ```ignore
//! let feed = MockPriceFeed::new()
//!     .with_quote(PriceQuote::new(67000.0, "mock", Timestamp::now()))
//!     .with_error(PriceFeedError::Upstream("price_fetch_failed".into()));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::ports::{PriceFeed, PriceFeedError, PriceQuote};

type Scripted = Result<PriceQuote, PriceFeedError>;

#[derive(Debug, Default)]
struct MockState {
    queue: VecDeque<Scripted>,
    last: Option<Scripted>,
    calls: usize,
}

/// Scripted `PriceFeed`.
#[derive(Debug, Clone, Default)]
pub struct MockPriceFeed {
    state: Arc<Mutex<MockState>>,
}

impl MockPriceFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful quote.
    pub fn with_quote(self, quote: PriceQuote) -> Self {
        self.lock().queue.push_back(Ok(quote));
        self
    }

    /// Queues a failure.
    pub fn with_error(self, error: PriceFeedError) -> Self {
        self.lock().queue.push_back(Err(error));
        self
    }

    /// Number of `latest()` calls so far.
    pub fn call_count(&self) -> usize {
        self.lock().calls
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PriceFeed for MockPriceFeed {
    async fn latest(&self) -> Result<PriceQuote, PriceFeedError> {
        let mut state = self.lock();
        state.calls += 1;

        if let Some(next) = state.queue.pop_front() {
            state.last = Some(next.clone());
            return next;
        }

        state.last.clone().unwrap_or_else(|| {
            Err(PriceFeedError::Network(
                "no scripted price response".to_string(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;

    #[tokio::test]
    async fn replays_then_repeats_last() {
        let feed = MockPriceFeed::new()
            .with_quote(PriceQuote::new(1.0, "mock", Timestamp::now()))
            .with_error(PriceFeedError::Upstream("x".into()));

        assert!(feed.latest().await.is_ok());
        assert!(feed.latest().await.is_err());
        assert!(feed.latest().await.is_err());
        assert_eq!(feed.call_count(), 3);
    }

    #[tokio::test]
    async fn empty_mock_fails() {
        let feed = MockPriceFeed::new();
        assert!(matches!(
            feed.latest().await,
            Err(PriceFeedError::Network(_))
        ));
    }
}
