//! Price oracle adapter boundary and quote validation

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::OracleError;
use crate::types::FeedId;

/// One USD quote for an asset: `price * 10^-expo` USD per whole token,
/// plus the feed-reported age of the observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    /// Signed integer price as published by the feed
    pub price: i64,
    /// Decimal exponent of `price`
    pub expo: u32,
    /// Seconds since the feed last updated
    pub age_secs: u64,
}

/// External price source the engine holds a handle to
pub trait PriceOracle: Send + Sync {
    /// Latest quote for `feed`, or why none is available
    fn quote(&self, feed: &FeedId) -> Result<PriceQuote, OracleError>;
}

/// Reject quotes the engine must not price against: non-positive prices
/// always, quotes older than `max_age_secs` when a bound is configured
pub fn validate_quote(
    feed: &FeedId,
    quote: &PriceQuote,
    max_age_secs: Option<u64>,
) -> Result<(), OracleError> {
    if quote.price <= 0 {
        return Err(OracleError::NonPositivePrice {
            feed: *feed,
            price: quote.price,
        });
    }
    if let Some(max_age_secs) = max_age_secs {
        if quote.age_secs > max_age_secs {
            return Err(OracleError::StalePrice {
                feed: *feed,
                age_secs: quote.age_secs,
                max_age_secs,
            });
        }
    }
    Ok(())
}

/// Fixed-price oracle backed by an in-memory table
///
/// Deterministic stand-in for a real adapter: tests script price moves with
/// [`StaticOracle::set`], the keeper binary seeds it from its config.
#[derive(Default)]
pub struct StaticOracle {
    quotes: RwLock<HashMap<FeedId, PriceQuote>>,
}

impl StaticOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the quote for `feed`
    pub fn set(&self, feed: FeedId, quote: PriceQuote) {
        self.quotes.write().insert(feed, quote);
    }

    /// Shorthand for a fresh quote at `price * 10^-expo` USD
    pub fn set_price(&self, feed: FeedId, price: i64, expo: u32) {
        self.set(
            feed,
            PriceQuote {
                price,
                expo,
                age_secs: 0,
            },
        );
    }
}

impl PriceOracle for StaticOracle {
    fn quote(&self, feed: &FeedId) -> Result<PriceQuote, OracleError> {
        self.quotes
            .read()
            .get(feed)
            .copied()
            .ok_or(OracleError::UnknownFeed(*feed))
    }
}
