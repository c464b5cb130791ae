//! PricePoller - background refresh of the latest known price.
//!
//! Polls a `PriceFeed` on a fixed interval and publishes each good quote
//! through a `watch` channel. A failed poll leaves the previous value in
//! place so subscribers keep showing the last known price.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `poll_interval` | 30s | How often to ask the feed |
//!
//! ## Graceful Shutdown
//!
//! The loop listens on a shutdown `watch::Receiver<bool>` and exits as soon
//! as it flips to `true`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::config::PriceConfig;
use crate::ports::{PriceFeed, PriceFeedError, PriceQuote};

/// Configuration for the PricePoller.
#[derive(Debug, Clone)]
pub struct PricePollerConfig {
    /// How often to refresh.
    pub poll_interval: Duration,
}

impl Default for PricePollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
        }
    }
}

impl PricePollerConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl From<&PriceConfig> for PricePollerConfig {
    fn from(config: &PriceConfig) -> Self {
        Self::default().with_poll_interval(config.poll_interval())
    }
}

/// Periodically refreshes the latest quote.
pub struct PricePoller {
    feed: Arc<dyn PriceFeed>,
    config: PricePollerConfig,
    latest: watch::Sender<Option<PriceQuote>>,
}

impl PricePoller {
    pub fn new(feed: Arc<dyn PriceFeed>) -> Self {
        Self::with_config(feed, PricePollerConfig::default())
    }

    pub fn with_config(feed: Arc<dyn PriceFeed>, config: PricePollerConfig) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            feed,
            config,
            latest,
        }
    }

    /// Receiver that always holds the latest known quote.
    pub fn subscribe(&self) -> watch::Receiver<Option<PriceQuote>> {
        self.latest.subscribe()
    }

    /// Latest known quote, if any poll has succeeded.
    pub fn latest(&self) -> Option<PriceQuote> {
        self.latest.borrow().clone()
    }

    /// Runs the poll loop until the shutdown signal is received.
    ///
    /// The first poll happens immediately.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::debug!("Price poller shutting down");
                        return;
                    }
                }

                _ = interval.tick() => {
                    // Failures are logged in poll_once; the loop keeps going.
                    let _ = self.poll_once().await;
                }
            }
        }
    }

    /// Runs exactly one poll cycle.
    ///
    /// On success the quote is published; on failure the previous value is
    /// kept and the error returned.
    pub async fn poll_once(&self) -> Result<PriceQuote, PriceFeedError> {
        match self.feed.latest().await {
            Ok(quote) => {
                tracing::debug!(
                    value = quote.value,
                    source = %quote.source,
                    stale = quote.stale,
                    "Price refreshed"
                );
                self.latest.send_replace(Some(quote.clone()));
                Ok(quote)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    error_code = ?e.code(),
                    has_previous = self.latest.borrow().is_some(),
                    "Price refresh failed, keeping previous value"
                );
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for PricePoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PricePoller")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
