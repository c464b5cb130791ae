//! Price feed adapters.
//!
//! - `HttpPriceFeed` - reqwest client for the price endpoint
//! - `CachedPriceFeed` - TTL cache that serves stale quotes on failure
//! - `PricePoller` - interval refresh publishing through a watch channel
//! - `MockPriceFeed` - scripted feed for tests

mod cached_price_feed;
mod http_price_feed;
mod mock_price_feed;
mod price_poller;

pub use cached_price_feed::{CachedPriceFeed, DEFAULT_PRICE_TTL};
pub use http_price_feed::{parse_price_envelope, HttpPriceFeed, HttpPriceFeedConfig};
pub use mock_price_feed::MockPriceFeed;
pub use price_poller::{PricePoller, PricePollerConfig};
