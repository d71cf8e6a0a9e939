//! End-to-end scenarios driven through the public engine API

use std::sync::Arc;

use parking_lot::Mutex;

use krona_engine::{
    AssetId, CollateralCustody, CollateralEngine, EngineConfig, EngineError, EngineEvent,
    OracleError, ParticipantId, PriceQuote, StaticOracle, TransferError, MIN_HEALTH_FACTOR,
    USD_SCALE,
};
use krona_integration_tests::{
    alice, bob, eth, eth_feed, testbed, SupplyIssuer, KUSD, UNIT,
};

#[test]
fn deposit_then_redeem_restores_all_balances() {
    let bed = testbed();
    bed.custody.fund(alice(), eth(), 20 * UNIT);

    bed.engine.deposit_collateral(alice(), eth(), 15 * UNIT).unwrap();
    assert_eq!(bed.custody.wallet_balance(alice(), eth()), 5 * UNIT);
    assert_eq!(bed.custody.vault_balance(eth()), 15 * UNIT);

    bed.engine.redeem_collateral(alice(), eth(), 15 * UNIT).unwrap();
    assert_eq!(bed.engine.collateral_balance(alice(), eth()), 0);
    assert_eq!(bed.custody.wallet_balance(alice(), eth()), 20 * UNIT);
    assert_eq!(bed.custody.vault_balance(eth()), 0);
}

#[test]
fn usd_value_of_fifteen_units_at_2000() {
    let bed = testbed();
    let value = bed.engine.usd_value(eth(), 15 * UNIT).unwrap();
    assert_eq!(value, 30_000 * USD_SCALE);
}

#[test]
fn reads_are_idempotent() {
    let bed = testbed();
    bed.custody.fund(alice(), eth(), 10 * UNIT);
    bed.engine.deposit_collateral(alice(), eth(), 10 * UNIT).unwrap();

    let first = bed.engine.account_collateral_value(alice()).unwrap();
    let second = bed.engine.account_collateral_value(alice()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, 20_000 * USD_SCALE);
}

#[test]
fn zero_amount_boundaries_never_mutate() {
    let bed = testbed();
    bed.custody.fund(alice(), eth(), 10 * UNIT);

    assert_eq!(
        bed.engine.deposit_collateral(alice(), eth(), 0),
        Err(EngineError::AmountZero)
    );
    assert_eq!(bed.engine.issue_debt(alice(), 0), Err(EngineError::AmountZero));

    assert!(bed.engine.participants().is_empty());
    assert!(bed.engine.drain_events().is_empty());
    assert_eq!(bed.custody.wallet_balance(alice(), eth()), 10 * UNIT);
}

#[test]
fn unregistered_asset_rejected_without_mutation() {
    let bed = testbed();
    let doge = AssetId::from_seed("DOGE");
    bed.custody.fund(alice(), doge, 10 * UNIT);

    assert_eq!(
        bed.engine.deposit_collateral(alice(), doge, UNIT),
        Err(EngineError::UnregisteredAsset(doge))
    );
    assert_eq!(bed.custody.wallet_balance(alice(), doge), 10 * UNIT);
    assert!(bed.engine.drain_events().is_empty());
}

#[test]
fn issue_to_exact_boundary_then_one_more_unit_fails() {
    let bed = testbed();
    bed.custody.fund(alice(), eth(), 10 * UNIT);
    bed.engine.deposit_collateral(alice(), eth(), 10 * UNIT).unwrap();

    // $20,000 of collateral counts as $10,000 at the 50% threshold
    bed.engine.issue_debt(alice(), 10_000 * KUSD).unwrap();
    assert_eq!(bed.engine.health_factor(alice()).unwrap(), MIN_HEALTH_FACTOR);

    let err = bed.engine.issue_debt(alice(), 1).unwrap_err();
    assert!(matches!(err, EngineError::BrokenHealthFactor { .. }));
    assert_eq!(bed.engine.debt_issued(alice()), 10_000 * KUSD);
}

#[test]
fn account_information_with_zero_debt_recovers_deposit() {
    let bed = testbed();
    bed.custody.fund(alice(), eth(), 10 * UNIT);
    bed.engine.deposit_collateral(alice(), eth(), 10 * UNIT).unwrap();

    let info = bed.engine.account_information(alice()).unwrap();
    assert_eq!(info.debt_issued, 0);
    assert_eq!(info.collateral_value_usd, 20_000 * USD_SCALE);

    // zero debt reports the maximal health factor
    assert_eq!(bed.engine.health_factor(alice()).unwrap(), u128::MAX);

    let recovered = bed
        .engine
        .token_amount_from_usd(eth(), info.collateral_value_usd)
        .unwrap();
    assert_eq!(recovered, 10 * UNIT);
}

#[test]
fn liquidation_improves_target_and_pays_the_liquidator() {
    let bed = testbed();
    bed.custody.fund(alice(), eth(), 10 * UNIT);
    bed.engine
        .deposit_collateral_and_issue_debt(alice(), eth(), 10 * UNIT, 8_000 * KUSD)
        .unwrap();
    bed.engine.drain_events();

    // $2000 -> $1500: discounted collateral $7,500 against $8,000 debt
    bed.oracle.set_price(eth_feed(), 1_500, 0);
    let hf_before = bed.engine.health_factor(alice()).unwrap();
    assert!(hf_before < MIN_HEALTH_FACTOR);

    // bob funds the repay with kUSD acquired outside the engine
    bed.issuer.seed_balance(bob(), 4_000 * KUSD);
    let supply_before = bed.issuer.total_supply();

    bed.engine
        .liquidate(bob(), alice(), eth(), 4_000 * KUSD)
        .unwrap();

    // $4,000 at $1500/unit plus the 10% bonus
    let seized = 2_933_333_332u128;
    assert_eq!(bed.engine.collateral_balance(alice(), eth()), 10 * UNIT - seized);
    assert_eq!(bed.engine.debt_issued(alice()), 4_000 * KUSD);
    assert!(bed.engine.health_factor(alice()).unwrap() > hf_before);

    // seized collateral landed in bob's wallet, his kUSD was burned
    assert_eq!(bed.custody.wallet_balance(bob(), eth()), seized);
    assert_eq!(bed.issuer.balance_of(bob()), 0);
    assert_eq!(bed.issuer.total_supply(), supply_before - 4_000 * KUSD);

    assert_eq!(
        bed.engine.drain_events(),
        vec![EngineEvent::Liquidated {
            participant: alice(),
            liquidator: bob(),
            asset: eth(),
            collateral_seized: seized,
            debt_covered: 4_000 * KUSD,
        }]
    );
}

#[test]
fn liquidation_of_healthy_position_is_rejected() {
    let bed = testbed();
    bed.custody.fund(alice(), eth(), 10 * UNIT);
    bed.engine
        .deposit_collateral_and_issue_debt(alice(), eth(), 10 * UNIT, 5_000 * KUSD)
        .unwrap();

    bed.issuer.seed_balance(bob(), 1_000 * KUSD);
    let err = bed
        .engine
        .liquidate(bob(), alice(), eth(), 1_000 * KUSD)
        .unwrap_err();
    assert!(matches!(err, EngineError::NotLiquidatable { .. }));
    assert_eq!(bed.engine.debt_issued(alice()), 5_000 * KUSD);
}

#[test]
fn event_stream_matches_operation_order() {
    let bed = testbed();
    bed.custody.fund(alice(), eth(), 10 * UNIT);

    bed.engine.deposit_collateral(alice(), eth(), 10 * UNIT).unwrap();
    bed.engine.issue_debt(alice(), 1_000 * KUSD).unwrap();
    bed.engine.repay_debt(alice(), 1_000 * KUSD).unwrap();
    bed.engine.redeem_collateral(alice(), eth(), 10 * UNIT).unwrap();

    let events = bed.engine.drain_events();
    assert_eq!(events.len(), 4);
    assert!(matches!(events[0], EngineEvent::CollateralDeposited { amount, .. } if amount == 10 * UNIT));
    assert!(matches!(events[1], EngineEvent::DebtIssued { amount, .. } if amount == 1_000 * KUSD));
    assert!(matches!(events[2], EngineEvent::DebtRepaid { amount, .. } if amount == 1_000 * KUSD));
    assert!(matches!(events[3], EngineEvent::CollateralRedeemed { amount, .. } if amount == 10 * UNIT));

    // a failed operation appends nothing
    assert!(bed.engine.issue_debt(alice(), 1_000_000 * KUSD).is_err());
    assert!(bed.engine.drain_events().is_empty());
}

#[test]
fn scripted_transfer_failure_leaves_no_trace() {
    let bed = testbed();
    bed.custody.fund(alice(), eth(), 10 * UNIT);
    bed.engine.deposit_collateral(alice(), eth(), 10 * UNIT).unwrap();
    bed.engine.drain_events();

    bed.custody.fail_next_push();
    let err = bed
        .engine
        .redeem_collateral(alice(), eth(), 5 * UNIT)
        .unwrap_err();
    assert!(matches!(err, EngineError::TransferOutFailed(_)));

    assert_eq!(bed.engine.collateral_balance(alice(), eth()), 10 * UNIT);
    assert_eq!(bed.custody.vault_balance(eth()), 10 * UNIT);
    assert_eq!(bed.custody.wallet_balance(alice(), eth()), 0);
    assert!(bed.engine.drain_events().is_empty());
}

#[test]
fn stale_quote_blocks_valuation_but_not_deposits() {
    let bed = testbed();
    bed.custody.fund(alice(), eth(), 10 * UNIT);

    bed.oracle.set(
        eth_feed(),
        PriceQuote {
            price: 2_000,
            expo: 0,
            age_secs: 120,
        },
    );

    // deposits need no valuation
    bed.engine.deposit_collateral(alice(), eth(), 10 * UNIT).unwrap();

    let err = bed.engine.usd_value(eth(), UNIT).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Oracle(OracleError::StalePrice { .. })
    ));

    // issuing needs the solvency check, which needs a fresh price
    let err = bed.engine.issue_debt(alice(), KUSD).unwrap_err();
    assert!(matches!(err, EngineError::Oracle(OracleError::StalePrice { .. })));
    assert_eq!(bed.engine.debt_issued(alice()), 0);
}

/// Custody that re-enters the engine from inside a transfer callback
struct ReentrantCustody {
    engine: Mutex<Option<Arc<CollateralEngine>>>,
    observed: Mutex<Option<EngineError>>,
}

impl CollateralCustody for ReentrantCustody {
    fn pull(
        &self,
        from: ParticipantId,
        _asset: AssetId,
        _amount: u128,
    ) -> Result<(), TransferError> {
        if let Some(engine) = self.engine.lock().as_ref() {
            let result = engine.issue_debt(from, 1);
            *self.observed.lock() = result.err();
        }
        Ok(())
    }

    fn push(&self, _to: ParticipantId, _asset: AssetId, _amount: u128) -> Result<(), TransferError> {
        Ok(())
    }
}

#[test]
fn reentrant_mutation_fails_immediately() {
    let oracle = Arc::new(StaticOracle::new());
    oracle.set_price(eth_feed(), 2_000, 0);
    let custody = Arc::new(ReentrantCustody {
        engine: Mutex::new(None),
        observed: Mutex::new(None),
    });
    let issuer = Arc::new(SupplyIssuer::new());

    let engine = Arc::new(
        CollateralEngine::new(
            EngineConfig::default(),
            vec![eth()],
            vec![eth_feed()],
            vec![9],
            oracle,
            custody.clone(),
            issuer,
        )
        .unwrap(),
    );
    *custody.engine.lock() = Some(engine.clone());

    // the outer deposit completes; the inner call it triggered was refused
    engine.deposit_collateral(alice(), eth(), UNIT).unwrap();
    assert_eq!(
        *custody.observed.lock(),
        Some(EngineError::ReentrantCall)
    );
    assert_eq!(engine.debt_issued(alice()), 0);
}
