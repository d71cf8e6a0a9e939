//! External token collaborator boundaries
//!
//! The engine never moves tokens itself; it instructs these collaborators
//! and treats any reported failure as fatal for the current operation.

use crate::error::TransferError;
use crate::types::{AssetId, ParticipantId};

/// Holds deposited collateral on the engine's behalf
pub trait CollateralCustody: Send + Sync {
    /// Pull `amount` of `asset` from `from` into engine custody
    fn pull(
        &self,
        from: ParticipantId,
        asset: AssetId,
        amount: u128,
    ) -> Result<(), TransferError>;

    /// Push `amount` of `asset` out of engine custody to `to`
    fn push(&self, to: ParticipantId, asset: AssetId, amount: u128) -> Result<(), TransferError>;
}

/// The only entity permitted to create or destroy units of the issued
/// debt asset; owned and called exclusively by the engine
pub trait DebtTokenIssuer: Send + Sync {
    /// Mint `amount` of the issued asset to `to`
    fn mint(&self, to: ParticipantId, amount: u128) -> Result<(), TransferError>;

    /// Pull `amount` of the issued asset from `from` and destroy it
    fn burn_from(&self, from: ParticipantId, amount: u128) -> Result<(), TransferError>;
}
