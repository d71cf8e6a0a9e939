//! Liquidation seizure planning

use crate::error::EngineError;
use crate::math::{bps_of, checked_add};
use crate::oracle::PriceOracle;
use crate::state::AssetEntry;
use crate::valuation::token_amount_from_usd;

/// How much collateral a liquidation call will seize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeizurePlan {
    /// Collateral base units equivalent to the covered debt's USD value
    pub base_amount: u128,
    /// Liquidator incentive on top of the base amount
    pub bonus_amount: u128,
    /// Total collateral to move from the participant to the liquidator
    pub total_seize: u128,
}

/// Plan the seizure for covering `debt_to_cover` (kUSD base units) in
/// `entry`'s asset, with the configured bonus on top.
///
/// Whether the participant actually holds `total_seize` is the caller's
/// check: if aggregate collateralization has fallen to 100% or below, the
/// bonus cannot be funded and the ledger decrement will reject - that
/// failure mode is surfaced, never silently patched.
pub fn plan_seizure(
    entry: &AssetEntry,
    oracle: &dyn PriceOracle,
    debt_to_cover: u128,
    liquidation_bonus_bps: u64,
    max_age_secs: Option<u64>,
) -> Result<SeizurePlan, EngineError> {
    let base_amount = token_amount_from_usd(entry, oracle, debt_to_cover, max_age_secs)?;
    let bonus_amount = bps_of(base_amount, liquidation_bonus_bps)?;
    let total_seize = checked_add(base_amount, bonus_amount)?;
    Ok(SeizurePlan {
        base_amount,
        bonus_amount,
        total_seize,
    })
}
