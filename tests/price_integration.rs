//! Integration tests for the price lookup stack.
//!
//! Feed → TTL cache → poller → watch subscribers, with a scripted upstream.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use odd_experiments::adapters::price::{parse_price_envelope, DEFAULT_PRICE_TTL};
use odd_experiments::adapters::{CachedPriceFeed, MockPriceFeed, PricePoller, PricePollerConfig};
use odd_experiments::domain::foundation::Timestamp;
use odd_experiments::ports::{PriceFeed, PriceFeedError, PriceQuote};

fn quote(value: f64) -> PriceQuote {
    PriceQuote::new(value, "coingecko", Timestamp::now())
}

#[test]
fn envelope_in_both_field_styles_parses() {
    let modern = parse_price_envelope(
        r#"{"ok":true,"value":67000.5,"source":"coingecko","timestamp":1700000000000}"#,
    )
    .unwrap();
    let legacy =
        parse_price_envelope(r#"{"ok":true,"btcUsd":67000.5,"source":"coinbase","ts":1700000000000}"#)
            .unwrap();

    assert_eq!(modern.value, 67000.5);
    assert_eq!(legacy.value, 67000.5);
    assert_eq!(legacy.source, "coinbase");
    assert_eq!(legacy.observed_at.as_unix_millis(), 1_700_000_000_000);
}

#[test]
fn failed_envelope_is_an_upstream_error() {
    let err = parse_price_envelope(r#"{"ok":false,"error":"price_fetch_failed"}"#).unwrap_err();
    assert_eq!(err, PriceFeedError::Upstream("price_fetch_failed".to_string()));
}

#[tokio::test(start_paused = true)]
async fn cache_serves_fresh_then_stale_quotes() {
    let upstream = MockPriceFeed::new()
        .with_quote(quote(100.0))
        .with_error(PriceFeedError::Network("connection refused".into()));
    let calls = upstream.clone();
    let cached = CachedPriceFeed::new(Arc::new(upstream));
    assert_eq!(cached.ttl(), DEFAULT_PRICE_TTL);

    let first = cached.latest().await.unwrap();
    let again = cached.latest().await.unwrap();
    assert_eq!(first, again);
    assert_eq!(calls.call_count(), 1);

    tokio::time::advance(DEFAULT_PRICE_TTL + Duration::from_secs(1)).await;
    let stale = cached.latest().await.unwrap();
    assert!(stale.stale);
    assert_eq!(stale.value, 100.0);
    assert_eq!(calls.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn poller_publishes_to_subscribers_and_survives_failures() {
    let upstream = MockPriceFeed::new()
        .with_quote(quote(100.0))
        .with_error(PriceFeedError::Timeout { timeout_secs: 10 })
        .with_quote(quote(105.0));
    let poller = Arc::new(PricePoller::with_config(
        Arc::new(upstream),
        PricePollerConfig::default().with_poll_interval(Duration::from_secs(30)),
    ));
    let mut rx = poller.subscribe();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let task = tokio::spawn({
        let poller = Arc::clone(&poller);
        async move { poller.run(shutdown_rx).await }
    });

    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().as_ref().map(|q| q.value), Some(100.0));

    // Second poll fails: subscribers still see the first quote.
    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(rx.borrow().as_ref().map(|q| q.value), Some(100.0));

    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().as_ref().map(|q| q.value), Some(105.0));

    shutdown_tx.send(true).unwrap();
    task.await.unwrap();
}
