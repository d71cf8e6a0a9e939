//! Shared ledger state

pub mod ledger;
pub mod registry;

pub use ledger::LedgerBook;
pub use registry::{AssetEntry, AssetRegistry};
