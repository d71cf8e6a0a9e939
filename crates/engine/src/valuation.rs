//! Valuation service: asset amounts to USD value and back
//!
//! All USD values are at [`USD_SCALE`] (1e6). Quotes are validated before
//! use - a non-positive or stale price never reaches the arithmetic.

use crate::error::EngineError;
use crate::math::{mul_div, pow10};
use crate::oracle::{validate_quote, PriceOracle};
use crate::state::{AssetEntry, AssetRegistry, LedgerBook};
use crate::types::{ParticipantId, USD_SCALE};

/// Validated price of one whole token of `entry`'s asset, at `USD_SCALE`
pub fn price_e6(
    entry: &AssetEntry,
    oracle: &dyn PriceOracle,
    max_age_secs: Option<u64>,
) -> Result<u128, EngineError> {
    let quote = oracle.quote(&entry.feed)?;
    validate_quote(&entry.feed, &quote, max_age_secs)?;
    // positivity was just validated, the cast cannot lose the sign
    let price = quote.price as u128;
    Ok(mul_div(price, USD_SCALE, pow10(quote.expo)?)?)
}

/// USD value of `amount` base units of `entry`'s asset
pub fn usd_value(
    entry: &AssetEntry,
    oracle: &dyn PriceOracle,
    amount: u128,
    max_age_secs: Option<u64>,
) -> Result<u128, EngineError> {
    let price = price_e6(entry, oracle, max_age_secs)?;
    Ok(mul_div(amount, price, pow10(entry.decimals)?)?)
}

/// Base units of `entry`'s asset worth `usd_amount` (at `USD_SCALE`)
pub fn token_amount_from_usd(
    entry: &AssetEntry,
    oracle: &dyn PriceOracle,
    usd_amount: u128,
    max_age_secs: Option<u64>,
) -> Result<u128, EngineError> {
    let price = price_e6(entry, oracle, max_age_secs)?;
    Ok(mul_div(usd_amount, pow10(entry.decimals)?, price)?)
}

/// Sum of `usd_value` over every registered asset for `participant`,
/// in registration order; zero-balance assets contribute zero without
/// an oracle round-trip
pub fn total_collateral_value(
    registry: &AssetRegistry,
    book: &LedgerBook,
    oracle: &dyn PriceOracle,
    participant: &ParticipantId,
    max_age_secs: Option<u64>,
) -> Result<u128, EngineError> {
    let mut total: u128 = 0;
    for entry in registry.entries() {
        let amount = book.collateral_of(participant, &entry.asset);
        if amount == 0 {
            continue;
        }
        let value = usd_value(entry, oracle, amount, max_age_secs)?;
        total = crate::math::checked_add(total, value)?;
    }
    Ok(total)
}
