//! Per-participant collateral and debt book
//!
//! Pure in-memory state with checked mutations; positions are created
//! implicitly on first touch and persist at zero. The book does no I/O and
//! no locking of its own - the engine serializes access around it.

use std::collections::{HashMap, HashSet};

use crate::error::EngineError;
use crate::math::{checked_add, checked_sub};
use crate::types::{AssetId, ParticipantId};

/// The two ledgers plus an insertion-ordered participant roster for
/// deterministic enumeration
#[derive(Default)]
pub struct LedgerBook {
    collateral: HashMap<ParticipantId, HashMap<AssetId, u128>>,
    debt: HashMap<ParticipantId, u128>,
    roster: Vec<ParticipantId>,
    seen: HashSet<ParticipantId>,
}

impl LedgerBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn touch(&mut self, participant: ParticipantId) {
        if self.seen.insert(participant) {
            self.roster.push(participant);
        }
    }

    /// Increase `participant`'s position in `asset`
    pub fn add_collateral(
        &mut self,
        participant: ParticipantId,
        asset: AssetId,
        amount: u128,
    ) -> Result<(), EngineError> {
        self.touch(participant);
        let balance = self
            .collateral
            .entry(participant)
            .or_default()
            .entry(asset)
            .or_insert(0);
        *balance = checked_add(*balance, amount)?;
        Ok(())
    }

    /// Decrease `participant`'s position in `asset`; a decrease that would
    /// go negative is rejected before mutation
    pub fn sub_collateral(
        &mut self,
        participant: ParticipantId,
        asset: AssetId,
        amount: u128,
    ) -> Result<(), EngineError> {
        let available = self.collateral_of(&participant, &asset);
        if available < amount {
            return Err(EngineError::InsufficientCollateral {
                asset,
                available,
                requested: amount,
            });
        }
        let balance = self
            .collateral
            .entry(participant)
            .or_default()
            .entry(asset)
            .or_insert(0);
        *balance = checked_sub(*balance, amount)?;
        Ok(())
    }

    /// Deposited amount of `asset` for `participant` (zero if never touched)
    pub fn collateral_of(&self, participant: &ParticipantId, asset: &AssetId) -> u128 {
        self.collateral
            .get(participant)
            .and_then(|positions| positions.get(asset))
            .copied()
            .unwrap_or(0)
    }

    /// Increase `participant`'s outstanding debt
    pub fn add_debt(
        &mut self,
        participant: ParticipantId,
        amount: u128,
    ) -> Result<(), EngineError> {
        self.touch(participant);
        let debt = self.debt.entry(participant).or_insert(0);
        *debt = checked_add(*debt, amount)?;
        Ok(())
    }

    /// Decrease `participant`'s outstanding debt; over-repay is rejected
    /// before mutation
    pub fn sub_debt(
        &mut self,
        participant: ParticipantId,
        amount: u128,
    ) -> Result<(), EngineError> {
        let outstanding = self.debt_of(&participant);
        if outstanding < amount {
            return Err(EngineError::RepayExceedsDebt {
                outstanding,
                requested: amount,
            });
        }
        let debt = self.debt.entry(participant).or_insert(0);
        *debt = checked_sub(*debt, amount)?;
        Ok(())
    }

    /// Outstanding debt of `participant` (zero if never touched)
    pub fn debt_of(&self, participant: &ParticipantId) -> u128 {
        self.debt.get(participant).copied().unwrap_or(0)
    }

    /// Every participant that ever held a position, in first-touch order
    pub fn participants(&self) -> &[ParticipantId] {
        &self.roster
    }
}
