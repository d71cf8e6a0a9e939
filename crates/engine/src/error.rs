//! Typed failure conditions for every engine operation
//!
//! Four families: input validation (rejected before any mutation),
//! invariant violations (rejected after tentative mutation + rollback),
//! collaborator failures (full rollback, no retry), and arithmetic
//! hazards (checked math, never a panic).

use thiserror::Error;

use crate::types::{AssetId, FeedId};

/// Arithmetic hazard surfaced by the checked helpers in [`crate::math`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("arithmetic overflow")]
    Overflow,
    #[error("arithmetic underflow")]
    Underflow,
    #[error("division by zero")]
    DivisionByZero,
}

/// Failure reported by an external token collaborator (custody or issuer)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Failure reported by the price oracle adapter or by quote validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("no price feed bound for {0}")]
    UnknownFeed(FeedId),
    #[error("feed {0} is unavailable")]
    Unavailable(FeedId),
    #[error("feed {feed} returned non-positive price {price}")]
    NonPositivePrice { feed: FeedId, price: i64 },
    #[error("feed {feed} quote is {age_secs}s old, freshness bound is {max_age_secs}s")]
    StalePrice {
        feed: FeedId,
        age_secs: u64,
        max_age_secs: u64,
    },
}

/// Failure of a single engine operation; the operation's state change is void
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("amount must be greater than zero")]
    AmountZero,
    #[error("asset {0} is not registered as collateral")]
    UnregisteredAsset(AssetId),
    #[error("asset {0} registered twice")]
    DuplicateAsset(AssetId),
    #[error(
        "asset/feed/decimals lists differ in length: {assets} assets, {feeds} feeds, {decimals} decimals"
    )]
    MismatchedFeedConfig {
        assets: usize,
        feeds: usize,
        decimals: usize,
    },
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("insufficient collateral in {asset}: have {available}, need {requested}")]
    InsufficientCollateral {
        asset: AssetId,
        available: u128,
        requested: u128,
    },
    #[error("repay of {requested} exceeds outstanding debt {outstanding}")]
    RepayExceedsDebt { outstanding: u128, requested: u128 },
    #[error("health factor {health_factor} is below the minimum")]
    BrokenHealthFactor { health_factor: u128 },
    #[error("position is not liquidatable (health factor {health_factor})")]
    NotLiquidatable { health_factor: u128 },
    #[error("liquidation did not improve health factor ({before} -> {after})")]
    HealthFactorNotImproved { before: u128, after: u128 },
    #[error("collateral transfer into custody failed: {0}")]
    TransferInFailed(TransferError),
    #[error("collateral transfer out of custody failed: {0}")]
    TransferOutFailed(TransferError),
    #[error("debt token mint failed: {0}")]
    MintFailed(TransferError),
    #[error("debt token burn failed: {0}")]
    BurnFailed(TransferError),
    #[error("oracle failure: {0}")]
    Oracle(#[from] OracleError),
    #[error("arithmetic failure: {0}")]
    Math(#[from] MathError),
    #[error("mutating call re-entered while another is in flight")]
    ReentrantCall,
}
