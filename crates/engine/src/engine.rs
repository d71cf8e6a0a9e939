//! Position manager and liquidation entry points
//!
//! Every mutating operation follows the same shape: validate, mutate the
//! ledger, perform the external call, then (for solvency-reducing
//! operations) re-check the invariant. Any failure past the mutation point
//! triggers an explicit compensating rollback before the lock is released,
//! so no partial state is ever visible.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockWriteGuard};

use crate::error::EngineError;
use crate::events::EngineEvent;
use crate::health::{self, AccountInformation};
use crate::liquidation;
use crate::oracle::PriceOracle;
use crate::state::{AssetRegistry, LedgerBook};
use crate::token::{CollateralCustody, DebtTokenIssuer};
use crate::types::{AssetId, FeedId, ParticipantId, BPS_DENOMINATOR, MIN_HEALTH_FACTOR};
use crate::valuation;

/// Engine risk parameters, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Discount applied to collateral value before comparing to debt
    /// (basis points; 5_000 = collateral counts at 50%)
    pub liquidation_threshold_bps: u64,
    /// Extra collateral awarded to a liquidator on top of the covered
    /// debt's value (basis points)
    pub liquidation_bonus_bps: u64,
    /// Freshness bound for oracle quotes; `None` disables the check
    pub max_quote_age_secs: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            liquidation_threshold_bps: 5_000,
            liquidation_bonus_bps: 1_000,
            max_quote_age_secs: Some(30),
        }
    }
}

impl EngineConfig {
    fn validate(&self) -> Result<(), EngineError> {
        if self.liquidation_threshold_bps == 0
            || self.liquidation_threshold_bps > BPS_DENOMINATOR
        {
            return Err(EngineError::InvalidConfig(
                "liquidation_threshold_bps must be in 1..=10_000",
            ));
        }
        Ok(())
    }
}

/// Everything behind the engine's single write lock
#[derive(Default)]
struct LedgerState {
    book: LedgerBook,
    events: Vec<EngineEvent>,
}

impl LedgerState {
    fn record(&mut self, event: EngineEvent) {
        log::debug!("event: {:?}", event);
        self.events.push(event);
    }
}

/// The debt-issuance engine: sole owner and sole mutator of both ledgers
pub struct CollateralEngine {
    config: EngineConfig,
    registry: AssetRegistry,
    state: RwLock<LedgerState>,
    oracle: Arc<dyn PriceOracle>,
    custody: Arc<dyn CollateralCustody>,
    issuer: Arc<dyn DebtTokenIssuer>,
}

impl std::fmt::Debug for CollateralEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollateralEngine")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl CollateralEngine {
    /// Build the engine from parallel asset/feed/decimals lists and the
    /// injected collaborators
    pub fn new(
        config: EngineConfig,
        assets: Vec<AssetId>,
        feeds: Vec<FeedId>,
        decimals: Vec<u32>,
        oracle: Arc<dyn PriceOracle>,
        custody: Arc<dyn CollateralCustody>,
        issuer: Arc<dyn DebtTokenIssuer>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let registry = AssetRegistry::new(assets, feeds, decimals)?;
        Ok(Self {
            config,
            registry,
            state: RwLock::new(LedgerState::default()),
            oracle,
            custody,
            issuer,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    // ============================================================================
    // Mutating operations
    // ============================================================================

    /// Deposit `amount` of `asset` for `participant`
    pub fn deposit_collateral(
        &self,
        participant: ParticipantId,
        asset: AssetId,
        amount: u128,
    ) -> Result<(), EngineError> {
        let mut state = self.write_state()?;
        self.deposit_locked(&mut state, participant, asset, amount)
    }

    /// Compound convenience: deposit, then issue; all-or-nothing
    pub fn deposit_collateral_and_issue_debt(
        &self,
        participant: ParticipantId,
        asset: AssetId,
        collateral_amount: u128,
        debt_amount: u128,
    ) -> Result<(), EngineError> {
        let mut state = self.write_state()?;
        let mark = state.events.len();

        self.deposit_locked(&mut state, participant, asset, collateral_amount)?;
        if let Err(err) = self.issue_locked(&mut state, participant, debt_amount) {
            // unwind the deposit leg so the compound call leaves no trace
            state
                .book
                .sub_collateral(participant, asset, collateral_amount)?;
            if let Err(push_err) = self.custody.push(participant, asset, collateral_amount) {
                return Err(EngineError::TransferOutFailed(push_err));
            }
            state.events.truncate(mark);
            return Err(err);
        }
        Ok(())
    }

    /// Withdraw `amount` of `asset`; rejects (and fully rolls back) if the
    /// remaining position would be insolvent
    pub fn redeem_collateral(
        &self,
        participant: ParticipantId,
        asset: AssetId,
        amount: u128,
    ) -> Result<(), EngineError> {
        let mut state = self.write_state()?;
        self.redeem_locked(&mut state, participant, asset, amount)
    }

    /// Compound convenience: repay, then redeem; repay runs first so the
    /// withdrawal-time solvency check already sees the reduced debt
    pub fn redeem_collateral_for_debt(
        &self,
        participant: ParticipantId,
        asset: AssetId,
        collateral_amount: u128,
        debt_amount: u128,
    ) -> Result<(), EngineError> {
        let mut state = self.write_state()?;
        let mark = state.events.len();

        self.repay_locked(&mut state, participant, participant, debt_amount)?;
        if let Err(err) = self.redeem_locked(&mut state, participant, asset, collateral_amount) {
            // unwind the repay leg
            state.book.add_debt(participant, debt_amount)?;
            if let Err(mint_err) = self.issuer.mint(participant, debt_amount) {
                return Err(EngineError::MintFailed(mint_err));
            }
            state.events.truncate(mark);
            return Err(err);
        }
        Ok(())
    }

    /// Issue `amount` of debt to `participant`, minting the issued asset
    pub fn issue_debt(
        &self,
        participant: ParticipantId,
        amount: u128,
    ) -> Result<(), EngineError> {
        let mut state = self.write_state()?;
        self.issue_locked(&mut state, participant, amount)
    }

    /// Repay `amount` of the caller's own debt, burning the issued asset
    pub fn repay_debt(
        &self,
        participant: ParticipantId,
        amount: u128,
    ) -> Result<(), EngineError> {
        let mut state = self.write_state()?;
        self.repay_locked(&mut state, participant, participant, amount)
    }

    /// Seize discounted collateral from an insolvent `participant` in
    /// exchange for repaying `debt_to_cover` of their debt, funded by
    /// `liquidator`
    pub fn liquidate(
        &self,
        liquidator: ParticipantId,
        participant: ParticipantId,
        collateral_asset: AssetId,
        debt_to_cover: u128,
    ) -> Result<(), EngineError> {
        Self::ensure_positive(debt_to_cover)?;
        let entry = *self.registry.require(&collateral_asset)?;

        let mut state = self.write_state()?;
        let mark = state.events.len();

        let hf_before = self.health_factor_locked(&state.book, &participant)?;
        if hf_before >= MIN_HEALTH_FACTOR {
            return Err(EngineError::NotLiquidatable {
                health_factor: hf_before,
            });
        }

        let plan = liquidation::plan_seizure(
            &entry,
            self.oracle.as_ref(),
            debt_to_cover,
            self.config.liquidation_bonus_bps,
            self.config.max_quote_age_secs,
        )?;

        // seize: if the bonus cannot be funded from the participant's
        // remaining collateral, this rejects before anything moves
        state
            .book
            .sub_collateral(participant, collateral_asset, plan.total_seize)?;
        if let Err(err) = self
            .custody
            .push(liquidator, collateral_asset, plan.total_seize)
        {
            state
                .book
                .add_collateral(participant, collateral_asset, plan.total_seize)?;
            return Err(EngineError::TransferOutFailed(err));
        }

        // forced repay on behalf of the participant, funded by the liquidator
        if let Err(err) = self.repay_locked(&mut state, liquidator, participant, debt_to_cover) {
            self.unwind_seizure(&mut state, liquidator, participant, collateral_asset, plan.total_seize)?;
            state.events.truncate(mark);
            return Err(err);
        }

        // post-conditions: the participant's position improved and the
        // liquidator's own position was not broken by the operation
        let post = self.liquidation_post_check(&state.book, &liquidator, &participant, hf_before);
        if let Err(err) = post {
            self.unwind_liquidation(
                &mut state,
                liquidator,
                participant,
                collateral_asset,
                plan.total_seize,
                debt_to_cover,
            )?;
            state.events.truncate(mark);
            return Err(err);
        }

        // one consolidated notification for the whole operation
        state.events.truncate(mark);
        state.record(EngineEvent::Liquidated {
            participant,
            liquidator,
            asset: collateral_asset,
            collateral_seized: plan.total_seize,
            debt_covered: debt_to_cover,
        });
        log::info!(
            "liquidated {}: seized {} of {}, covered {} debt (liquidator {})",
            participant,
            plan.total_seize,
            collateral_asset,
            debt_to_cover,
            liquidator
        );
        Ok(())
    }

    /// Drain the buffered notifications in serialization order
    pub fn drain_events(&self) -> Vec<EngineEvent> {
        let mut state = self.state.write();
        std::mem::take(&mut state.events)
    }

    // ============================================================================
    // Read-only queries
    // ============================================================================

    /// Health factor of `participant`; `u128::MAX` when they have no debt
    pub fn health_factor(&self, participant: ParticipantId) -> Result<u128, EngineError> {
        let state = self.state.read();
        self.health_factor_locked(&state.book, &participant)
    }

    /// Outstanding debt plus total collateral value for `participant`
    pub fn account_information(
        &self,
        participant: ParticipantId,
    ) -> Result<AccountInformation, EngineError> {
        let state = self.state.read();
        health::account_information(
            &self.registry,
            &state.book,
            self.oracle.as_ref(),
            &participant,
            self.config.max_quote_age_secs,
        )
    }

    /// USD value (at `USD_SCALE`) of `amount` base units of `asset`
    pub fn usd_value(&self, asset: AssetId, amount: u128) -> Result<u128, EngineError> {
        let entry = self.registry.require(&asset)?;
        valuation::usd_value(
            entry,
            self.oracle.as_ref(),
            amount,
            self.config.max_quote_age_secs,
        )
    }

    /// Base units of `asset` worth `usd_amount` (at `USD_SCALE`)
    pub fn token_amount_from_usd(
        &self,
        asset: AssetId,
        usd_amount: u128,
    ) -> Result<u128, EngineError> {
        let entry = self.registry.require(&asset)?;
        valuation::token_amount_from_usd(
            entry,
            self.oracle.as_ref(),
            usd_amount,
            self.config.max_quote_age_secs,
        )
    }

    /// Total collateral value of `participant` across registered assets
    pub fn account_collateral_value(
        &self,
        participant: ParticipantId,
    ) -> Result<u128, EngineError> {
        let state = self.state.read();
        valuation::total_collateral_value(
            &self.registry,
            &state.book,
            self.oracle.as_ref(),
            &participant,
            self.config.max_quote_age_secs,
        )
    }

    /// Deposited balance of `asset` for `participant`
    pub fn collateral_balance(&self, participant: ParticipantId, asset: AssetId) -> u128 {
        self.state.read().book.collateral_of(&participant, &asset)
    }

    /// Outstanding debt of `participant`, kUSD base units
    pub fn debt_issued(&self, participant: ParticipantId) -> u128 {
        self.state.read().book.debt_of(&participant)
    }

    /// Every participant that ever held a position, in first-touch order
    pub fn participants(&self) -> Vec<ParticipantId> {
        self.state.read().book.participants().to_vec()
    }

    // ============================================================================
    // Internals
    // ============================================================================

    /// Acquire the write lock without blocking; a mutating call arriving
    /// while another is in flight (including re-entrant invocation from a
    /// collaborator callback) fails immediately
    fn write_state(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, EngineError> {
        self.state.try_write().ok_or(EngineError::ReentrantCall)
    }

    fn ensure_positive(amount: u128) -> Result<(), EngineError> {
        if amount == 0 {
            return Err(EngineError::AmountZero);
        }
        Ok(())
    }

    fn health_factor_locked(
        &self,
        book: &LedgerBook,
        participant: &ParticipantId,
    ) -> Result<u128, EngineError> {
        health::health_factor(
            &self.registry,
            book,
            self.oracle.as_ref(),
            participant,
            self.config.liquidation_threshold_bps,
            self.config.max_quote_age_secs,
        )
    }

    fn assert_solvent_locked(
        &self,
        book: &LedgerBook,
        participant: &ParticipantId,
    ) -> Result<(), EngineError> {
        health::assert_solvent(
            &self.registry,
            book,
            self.oracle.as_ref(),
            participant,
            self.config.liquidation_threshold_bps,
            self.config.max_quote_age_secs,
        )
    }

    fn deposit_locked(
        &self,
        state: &mut LedgerState,
        participant: ParticipantId,
        asset: AssetId,
        amount: u128,
    ) -> Result<(), EngineError> {
        Self::ensure_positive(amount)?;
        self.registry.require(&asset)?;

        state.book.add_collateral(participant, asset, amount)?;
        if let Err(err) = self.custody.pull(participant, asset, amount) {
            // revert the increment just applied
            state.book.sub_collateral(participant, asset, amount)?;
            return Err(EngineError::TransferInFailed(err));
        }
        state.record(EngineEvent::CollateralDeposited {
            participant,
            asset,
            amount,
        });
        Ok(())
    }

    fn redeem_locked(
        &self,
        state: &mut LedgerState,
        participant: ParticipantId,
        asset: AssetId,
        amount: u128,
    ) -> Result<(), EngineError> {
        Self::ensure_positive(amount)?;

        state.book.sub_collateral(participant, asset, amount)?;
        if let Err(err) = self.custody.push(participant, asset, amount) {
            state.book.add_collateral(participant, asset, amount)?;
            return Err(EngineError::TransferOutFailed(err));
        }
        if let Err(err) = self.assert_solvent_locked(&state.book, &participant) {
            // roll back the ledger decrement and the outbound transfer
            state.book.add_collateral(participant, asset, amount)?;
            if let Err(pull_err) = self.custody.pull(participant, asset, amount) {
                return Err(EngineError::TransferInFailed(pull_err));
            }
            return Err(err);
        }
        state.record(EngineEvent::CollateralRedeemed {
            participant,
            asset,
            amount,
        });
        Ok(())
    }

    fn issue_locked(
        &self,
        state: &mut LedgerState,
        participant: ParticipantId,
        amount: u128,
    ) -> Result<(), EngineError> {
        Self::ensure_positive(amount)?;

        // debt is recorded first so the check runs on the post-issue state
        state.book.add_debt(participant, amount)?;
        if let Err(err) = self.assert_solvent_locked(&state.book, &participant) {
            state.book.sub_debt(participant, amount)?;
            return Err(err);
        }
        if let Err(err) = self.issuer.mint(participant, amount) {
            state.book.sub_debt(participant, amount)?;
            return Err(EngineError::MintFailed(err));
        }
        state.record(EngineEvent::DebtIssued {
            participant,
            amount,
        });
        Ok(())
    }

    /// Decrease `on_behalf_of`'s debt, funded by `payer`. Never re-checks
    /// anyone's solvency itself; when the two differ (liquidation) the
    /// caller re-validates the affected positions.
    fn repay_locked(
        &self,
        state: &mut LedgerState,
        payer: ParticipantId,
        on_behalf_of: ParticipantId,
        amount: u128,
    ) -> Result<(), EngineError> {
        Self::ensure_positive(amount)?;

        state.book.sub_debt(on_behalf_of, amount)?;
        if let Err(err) = self.issuer.burn_from(payer, amount) {
            state.book.add_debt(on_behalf_of, amount)?;
            return Err(EngineError::BurnFailed(err));
        }
        state.record(EngineEvent::DebtRepaid {
            payer,
            on_behalf_of,
            amount,
        });
        Ok(())
    }

    fn liquidation_post_check(
        &self,
        book: &LedgerBook,
        liquidator: &ParticipantId,
        participant: &ParticipantId,
        hf_before: u128,
    ) -> Result<(), EngineError> {
        let hf_after = self.health_factor_locked(book, participant)?;
        if book.debt_of(participant) != 0 && hf_after <= hf_before {
            return Err(EngineError::HealthFactorNotImproved {
                before: hf_before,
                after: hf_after,
            });
        }
        self.assert_solvent_locked(book, liquidator)
    }

    /// Revert the collateral-seizure leg: ledger increment back, tokens
    /// pulled back from the liquidator
    fn unwind_seizure(
        &self,
        state: &mut LedgerState,
        liquidator: ParticipantId,
        participant: ParticipantId,
        asset: AssetId,
        amount: u128,
    ) -> Result<(), EngineError> {
        state.book.add_collateral(participant, asset, amount)?;
        self.custody
            .pull(liquidator, asset, amount)
            .map_err(EngineError::TransferInFailed)
    }

    /// Revert both liquidation legs, repay first (it was applied last)
    fn unwind_liquidation(
        &self,
        state: &mut LedgerState,
        liquidator: ParticipantId,
        participant: ParticipantId,
        asset: AssetId,
        seized: u128,
        debt_covered: u128,
    ) -> Result<(), EngineError> {
        state.book.add_debt(participant, debt_covered)?;
        if let Err(err) = self.issuer.mint(liquidator, debt_covered) {
            return Err(EngineError::MintFailed(err));
        }
        self.unwind_seizure(state, liquidator, participant, asset, seized)
    }
}
