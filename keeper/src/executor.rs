//! Liquidation sizing and submission

use anyhow::{bail, Context, Result};
use krona_engine::{AssetId, CollateralEngine, ParticipantId, BPS_DENOMINATOR};

use crate::health::ParticipantHealth;

/// Size the debt to cover from the close factor: a share of the target's
/// outstanding debt, at least one base unit, never more than the whole debt
pub fn size_debt_to_cover(debt_issued: u128, close_factor_bps: u64) -> u128 {
    if debt_issued == 0 {
        return 0;
    }
    let sized = debt_issued.saturating_mul(close_factor_bps as u128) / BPS_DENOMINATOR as u128;
    sized.clamp(1, debt_issued)
}

/// Pick the target's largest collateral position among registered assets
pub fn choose_collateral_asset(
    engine: &CollateralEngine,
    participant: ParticipantId,
) -> Option<AssetId> {
    engine
        .registry()
        .entries()
        .iter()
        .map(|entry| (entry.asset, engine.collateral_balance(participant, entry.asset)))
        .filter(|(_, balance)| *balance > 0)
        .max_by_key(|(_, balance)| *balance)
        .map(|(asset, _)| asset)
}

/// Submit one liquidation call for `target`, funded by the keeper
pub fn execute_liquidation(
    engine: &CollateralEngine,
    keeper_id: ParticipantId,
    target: &ParticipantHealth,
    close_factor_bps: u64,
) -> Result<u128> {
    let asset = choose_collateral_asset(engine, target.participant)
        .context("target holds no collateral in any registered asset")?;

    let debt_to_cover = size_debt_to_cover(target.debt_issued, close_factor_bps);
    if debt_to_cover == 0 {
        bail!("target has no outstanding debt");
    }

    engine
        .liquidate(keeper_id, target.participant, asset, debt_to_cover)
        .with_context(|| format!("liquidation of {} failed", target.participant))?;

    Ok(debt_to_cover)
}
