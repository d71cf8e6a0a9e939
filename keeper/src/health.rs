//! Participant health scanning

use krona_engine::{CollateralEngine, ParticipantId};

/// Health snapshot for one participant
#[derive(Debug, Clone)]
pub struct ParticipantHealth {
    pub participant: ParticipantId,
    /// Health factor at 1e6 scale; `u128::MAX` for debt-free positions
    pub health_factor: u128,
    /// Outstanding debt, kUSD base units
    pub debt_issued: u128,
    /// Total collateral value at 1e6 scale
    pub collateral_value_usd: u128,
}

impl ParticipantHealth {
    /// Check if the position can be liquidated
    pub fn needs_liquidation(&self, min_health_factor: u128) -> bool {
        self.health_factor < min_health_factor
    }
}

/// Snapshot every participant the engine knows about
///
/// A participant whose valuation fails (oracle outage, stale feed) is
/// logged and skipped; the next poll tick retries naturally.
pub fn scan(engine: &CollateralEngine) -> Vec<ParticipantHealth> {
    let mut snapshots = Vec::new();

    for participant in engine.participants() {
        let info = match engine.account_information(participant) {
            Ok(info) => info,
            Err(e) => {
                log::warn!("Skipping {}: account lookup failed: {}", participant, e);
                continue;
            }
        };
        let health_factor = match engine.health_factor(participant) {
            Ok(hf) => hf,
            Err(e) => {
                log::warn!("Skipping {}: health factor failed: {}", participant, e);
                continue;
            }
        };

        snapshots.push(ParticipantHealth {
            participant,
            health_factor,
            debt_issued: info.debt_issued,
            collateral_value_usd: info.collateral_value_usd,
        });
    }

    snapshots
}
