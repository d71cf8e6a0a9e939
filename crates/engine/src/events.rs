//! Observable engine notifications
//!
//! Events are appended under the same write lock as the ledger mutation
//! they describe, so event order equals serialization order. Failed
//! operations append nothing.

use crate::types::{AssetId, ParticipantId};

/// One notification per successfully completed mutating operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    CollateralDeposited {
        participant: ParticipantId,
        asset: AssetId,
        amount: u128,
    },
    CollateralRedeemed {
        participant: ParticipantId,
        asset: AssetId,
        amount: u128,
    },
    DebtIssued {
        participant: ParticipantId,
        amount: u128,
    },
    DebtRepaid {
        payer: ParticipantId,
        on_behalf_of: ParticipantId,
        amount: u128,
    },
    Liquidated {
        participant: ParticipantId,
        liquidator: ParticipantId,
        asset: AssetId,
        collateral_seized: u128,
        debt_covered: u128,
    },
}
