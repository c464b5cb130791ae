//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `storage` - Key/value stores (in-memory, file)
//! - `random` - Seeded and scripted random sources
//! - `price` - HTTP price feed, TTL cache, background poller

pub mod price;
pub mod random;
pub mod storage;

pub use price::{CachedPriceFeed, HttpPriceFeed, MockPriceFeed, PricePoller, PricePollerConfig};
pub use random::{ScriptedRandomSource, SeededRandomSource};
pub use storage::{storage_scopes, FileKeyValueStore, InMemoryKeyValueStore};
