//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `KeyValueStore` - client-side persistence (persistent and per-session scopes)
//! - `RandomSource` - injected uniform randomness
//! - `PriceFeed` - latest known price from the price lookup endpoint

mod key_value_store;
mod price_feed;
mod random_source;

pub use key_value_store::{KeyValueStore, StorageError, StorageKey, StorageScopes};
pub use price_feed::{PriceFeed, PriceFeedError, PriceQuote};
pub use random_source::RandomSource;
