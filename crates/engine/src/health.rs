//! Health factor calculation
//!
//! Solvency is recomputed from the ledgers on demand, never cached.
//! A zero-debt position reports the maximal health factor (`u128::MAX`)
//! rather than dividing by zero.

use crate::error::EngineError;
use crate::math::{bps_of, mul_div};
use crate::oracle::PriceOracle;
use crate::state::{AssetRegistry, LedgerBook};
use crate::types::{ParticipantId, HEALTH_SCALE, MIN_HEALTH_FACTOR};
use crate::valuation::total_collateral_value;

/// Snapshot of one participant's position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountInformation {
    /// Outstanding issued debt, kUSD base units
    pub debt_issued: u128,
    /// Total deposited collateral value, at `USD_SCALE`
    pub collateral_value_usd: u128,
}

/// Pure lookup composition over the two ledgers, no mutation
pub fn account_information(
    registry: &AssetRegistry,
    book: &LedgerBook,
    oracle: &dyn PriceOracle,
    participant: &ParticipantId,
    max_age_secs: Option<u64>,
) -> Result<AccountInformation, EngineError> {
    Ok(AccountInformation {
        debt_issued: book.debt_of(participant),
        collateral_value_usd: total_collateral_value(
            registry,
            book,
            oracle,
            participant,
            max_age_secs,
        )?,
    })
}

/// Health factor from already-looked-up parts, at `HEALTH_SCALE`:
/// `collateral_value * threshold_bps / 10_000 * HEALTH_SCALE / debt`
pub fn health_factor_from_parts(
    collateral_value_usd: u128,
    debt_issued: u128,
    liquidation_threshold_bps: u64,
) -> Result<u128, EngineError> {
    if debt_issued == 0 {
        return Ok(u128::MAX);
    }
    let adjusted = bps_of(collateral_value_usd, liquidation_threshold_bps)?;
    Ok(mul_div(adjusted, HEALTH_SCALE, debt_issued)?)
}

/// Health factor of `participant`'s current position
pub fn health_factor(
    registry: &AssetRegistry,
    book: &LedgerBook,
    oracle: &dyn PriceOracle,
    participant: &ParticipantId,
    liquidation_threshold_bps: u64,
    max_age_secs: Option<u64>,
) -> Result<u128, EngineError> {
    let info = account_information(registry, book, oracle, participant, max_age_secs)?;
    health_factor_from_parts(
        info.collateral_value_usd,
        info.debt_issued,
        liquidation_threshold_bps,
    )
}

/// Final step of every solvency-reducing operation; carries the computed
/// ratio when it is below the minimum
pub fn assert_solvent(
    registry: &AssetRegistry,
    book: &LedgerBook,
    oracle: &dyn PriceOracle,
    participant: &ParticipantId,
    liquidation_threshold_bps: u64,
    max_age_secs: Option<u64>,
) -> Result<(), EngineError> {
    let health_factor = health_factor(
        registry,
        book,
        oracle,
        participant,
        liquidation_threshold_bps,
        max_age_secs,
    )?;
    if health_factor < MIN_HEALTH_FACTOR {
        log::warn!(
            "broken health factor for {}: {} < {}",
            participant,
            health_factor,
            MIN_HEALTH_FACTOR
        );
        return Err(EngineError::BrokenHealthFactor { health_factor });
    }
    Ok(())
}
