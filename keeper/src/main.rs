//! Krona Liquidation Keeper
//!
//! Off-chain service that monitors participant health and submits
//! liquidations for undercollateralized positions.

mod config;
mod executor;
mod health;
mod priority_queue;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use config::Config;
use krona_engine::{
    AssetId, CollateralCustody, CollateralEngine, DebtTokenIssuer, EngineConfig, ParticipantId,
    StaticOracle, TransferError, MIN_HEALTH_FACTOR,
};
use priority_queue::HealthQueue;
use tokio::time;

/// Custody stand-in for local runs: accepts every transfer.
/// Production wiring injects the real custody here.
pub(crate) struct OpenCustody;

impl CollateralCustody for OpenCustody {
    fn pull(&self, _from: ParticipantId, _asset: AssetId, _amount: u128) -> Result<(), TransferError> {
        Ok(())
    }

    fn push(&self, _to: ParticipantId, _asset: AssetId, _amount: u128) -> Result<(), TransferError> {
        Ok(())
    }
}

/// Issuer stand-in for local runs: accepts every mint and burn
pub(crate) struct OpenIssuer;

impl DebtTokenIssuer for OpenIssuer {
    fn mint(&self, _to: ParticipantId, _amount: u128) -> Result<(), TransferError> {
        Ok(())
    }

    fn burn_from(&self, _from: ParticipantId, _amount: u128) -> Result<(), TransferError> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Krona Liquidation Keeper");

    // Load configuration
    let config = Config::load().unwrap_or_else(|_| {
        log::warn!("Failed to load config, using default local config");
        Config::default_local()
    });

    let engine = build_engine(&config)?;
    log::info!(
        "Keeper {} monitoring {} registered assets",
        config.keeper_id,
        engine.registry().len()
    );

    let mut queue = HealthQueue::new();

    log::info!("Keeper service started. Monitoring for liquidations...");

    // Main event loop
    let mut interval = time::interval(Duration::from_secs(config.poll_interval_secs));

    loop {
        interval.tick().await;

        if let Err(e) = process_liquidations(&engine, &mut queue, &config) {
            log::error!("Error processing liquidations: {}", e);
        }

        if !queue.is_empty() {
            log::debug!("Health queue size: {}", queue.len());

            if let Some(worst) = queue.peek() {
                log::debug!("Worst health factor: {}", worst.health_factor);
            }
        }
    }
}

/// Build an engine over the config's asset table, priced by a static
/// oracle seeded from the same table. Custody and issuance are open
/// stand-ins; production wiring injects the real collaborators.
fn build_engine(config: &Config) -> Result<Arc<CollateralEngine>> {
    let oracle = Arc::new(StaticOracle::new());
    for asset in &config.assets {
        oracle.set_price(asset.feed, asset.price, asset.expo);
    }

    let engine = CollateralEngine::new(
        EngineConfig {
            liquidation_threshold_bps: config.liquidation_threshold_bps,
            liquidation_bonus_bps: config.liquidation_bonus_bps,
            max_quote_age_secs: config.max_quote_age_secs,
        },
        config.assets.iter().map(|a| a.asset).collect(),
        config.assets.iter().map(|a| a.feed).collect(),
        config.assets.iter().map(|a| a.decimals).collect(),
        oracle,
        Arc::new(OpenCustody),
        Arc::new(OpenIssuer),
    )?;

    Ok(Arc::new(engine))
}

/// One poll tick: refresh snapshots, then liquidate the worst offenders
fn process_liquidations(
    engine: &CollateralEngine,
    queue: &mut HealthQueue,
    config: &Config,
) -> Result<()> {
    for snapshot in health::scan(engine) {
        queue.push(snapshot);
    }

    let liquidatable = queue.get_liquidatable(MIN_HEALTH_FACTOR);

    if liquidatable.is_empty() {
        log::debug!("No positions need liquidation");
        return Ok(());
    }

    log::info!("Found {} positions needing liquidation", liquidatable.len());

    let batch_size = config.max_liquidations_per_batch.min(liquidatable.len());

    for target in liquidatable.iter().take(batch_size) {
        log::info!(
            "Liquidating {} (health factor {})",
            target.participant,
            target.health_factor
        );

        match executor::execute_liquidation(engine, config.keeper_id, target, config.close_factor_bps)
        {
            Ok(debt_covered) => {
                log::info!(
                    "Covered {} debt for {}",
                    debt_covered,
                    target.participant
                );
                queue.remove(&target.participant);
            }
            Err(e) => {
                log::error!("Failed to liquidate {}: {:#}", target.participant, e);
            }
        }
    }

    Ok(())
}
