//! Krona: an over-collateralized debt-issuance accounting engine
//!
//! Participants deposit accepted collateral assets and issue kUSD against
//! them. Every state-changing operation enforces that collateral value,
//! discounted by the liquidation threshold, never falls below outstanding
//! debt; positions that slip below the boundary can be liquidated by third
//! parties for a collateral bonus.
//!
//! Token movement and prices are external: the engine holds injected
//! [`token::CollateralCustody`], [`token::DebtTokenIssuer`], and
//! [`oracle::PriceOracle`] handles and performs no I/O of its own.

pub mod engine;
pub mod error;
pub mod events;
pub mod health;
pub mod liquidation;
pub mod math;
pub mod oracle;
pub mod state;
pub mod token;
pub mod types;
pub mod valuation;

pub use engine::{CollateralEngine, EngineConfig};
pub use error::{EngineError, MathError, OracleError, TransferError};
pub use events::EngineEvent;
pub use health::AccountInformation;
pub use liquidation::SeizurePlan;
pub use oracle::{PriceOracle, PriceQuote, StaticOracle};
pub use state::{AssetEntry, AssetRegistry, LedgerBook};
pub use token::{CollateralCustody, DebtTokenIssuer};
pub use types::{
    AssetId, FeedId, ParticipantId, BPS_DENOMINATOR, DEBT_DECIMALS, HEALTH_SCALE,
    MIN_HEALTH_FACTOR, USD_SCALE,
};
