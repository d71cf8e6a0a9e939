//! Krona integration test harness
//!
//! Deterministic collaborator fakes shared by the scenario and property
//! tests: a custody that tracks wallet and vault balances (and can be
//! scripted to fail), and an issuer that tracks kUSD balances and supply.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use krona_engine::{
    AssetId, CollateralCustody, CollateralEngine, DebtTokenIssuer, EngineConfig, FeedId,
    ParticipantId, StaticOracle, TransferError,
};

/// Custody fake with real balance accounting: participants hold wallet
/// balances outside the engine, pulls move them into a per-asset vault
pub struct WalletCustody {
    wallets: Mutex<HashMap<(ParticipantId, AssetId), u128>>,
    vault: Mutex<HashMap<AssetId, u128>>,
    fail_next_pull: AtomicBool,
    fail_next_push: AtomicBool,
}

impl WalletCustody {
    pub fn new() -> Self {
        Self {
            wallets: Mutex::new(HashMap::new()),
            vault: Mutex::new(HashMap::new()),
            fail_next_pull: AtomicBool::new(false),
            fail_next_push: AtomicBool::new(false),
        }
    }

    /// Credit a participant's wallet (tokens acquired outside the engine)
    pub fn fund(&self, participant: ParticipantId, asset: AssetId, amount: u128) {
        *self.wallets.lock().entry((participant, asset)).or_insert(0) += amount;
    }

    pub fn wallet_balance(&self, participant: ParticipantId, asset: AssetId) -> u128 {
        self.wallets
            .lock()
            .get(&(participant, asset))
            .copied()
            .unwrap_or(0)
    }

    pub fn vault_balance(&self, asset: AssetId) -> u128 {
        self.vault.lock().get(&asset).copied().unwrap_or(0)
    }

    /// Script the next pull to fail
    pub fn fail_next_pull(&self) {
        self.fail_next_pull.store(true, Ordering::SeqCst);
    }

    /// Script the next push to fail
    pub fn fail_next_push(&self) {
        self.fail_next_push.store(true, Ordering::SeqCst);
    }
}

impl Default for WalletCustody {
    fn default() -> Self {
        Self::new()
    }
}

impl CollateralCustody for WalletCustody {
    fn pull(
        &self,
        from: ParticipantId,
        asset: AssetId,
        amount: u128,
    ) -> Result<(), TransferError> {
        if self.fail_next_pull.swap(false, Ordering::SeqCst) {
            return Err(TransferError::Rejected("scripted pull failure".into()));
        }
        let mut wallets = self.wallets.lock();
        let balance = wallets.entry((from, asset)).or_insert(0);
        if *balance < amount {
            return Err(TransferError::InsufficientBalance);
        }
        *balance -= amount;
        *self.vault.lock().entry(asset).or_insert(0) += amount;
        Ok(())
    }

    fn push(&self, to: ParticipantId, asset: AssetId, amount: u128) -> Result<(), TransferError> {
        if self.fail_next_push.swap(false, Ordering::SeqCst) {
            return Err(TransferError::Rejected("scripted push failure".into()));
        }
        let mut vault = self.vault.lock();
        let balance = vault.entry(asset).or_insert(0);
        if *balance < amount {
            return Err(TransferError::InsufficientBalance);
        }
        *balance -= amount;
        *self.wallets.lock().entry((to, asset)).or_insert(0) += amount;
        Ok(())
    }
}

/// Issuer fake with real kUSD balance accounting
pub struct SupplyIssuer {
    balances: Mutex<HashMap<ParticipantId, u128>>,
    supply: Mutex<u128>,
    fail_next_mint: AtomicBool,
    fail_next_burn: AtomicBool,
}

impl SupplyIssuer {
    pub fn new() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            supply: Mutex::new(0),
            fail_next_mint: AtomicBool::new(false),
            fail_next_burn: AtomicBool::new(false),
        }
    }

    /// Credit kUSD acquired outside the engine (e.g. bought on market);
    /// lets a liquidator fund forced repays in a closed test world
    pub fn seed_balance(&self, participant: ParticipantId, amount: u128) {
        *self.balances.lock().entry(participant).or_insert(0) += amount;
        *self.supply.lock() += amount;
    }

    pub fn balance_of(&self, participant: ParticipantId) -> u128 {
        self.balances.lock().get(&participant).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        *self.supply.lock()
    }

    pub fn fail_next_mint(&self) {
        self.fail_next_mint.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_burn(&self) {
        self.fail_next_burn.store(true, Ordering::SeqCst);
    }
}

impl Default for SupplyIssuer {
    fn default() -> Self {
        Self::new()
    }
}

impl DebtTokenIssuer for SupplyIssuer {
    fn mint(&self, to: ParticipantId, amount: u128) -> Result<(), TransferError> {
        if self.fail_next_mint.swap(false, Ordering::SeqCst) {
            return Err(TransferError::Rejected("scripted mint failure".into()));
        }
        *self.balances.lock().entry(to).or_insert(0) += amount;
        *self.supply.lock() += amount;
        Ok(())
    }

    fn burn_from(&self, from: ParticipantId, amount: u128) -> Result<(), TransferError> {
        if self.fail_next_burn.swap(false, Ordering::SeqCst) {
            return Err(TransferError::Rejected("scripted burn failure".into()));
        }
        let mut balances = self.balances.lock();
        let balance = balances.entry(from).or_insert(0);
        if *balance < amount {
            return Err(TransferError::InsufficientBalance);
        }
        *balance -= amount;
        *self.supply.lock() -= amount;
        Ok(())
    }
}

/// Everything a scenario needs, with handles kept to script the fakes
pub struct TestBed {
    pub engine: Arc<CollateralEngine>,
    pub oracle: Arc<StaticOracle>,
    pub custody: Arc<WalletCustody>,
    pub issuer: Arc<SupplyIssuer>,
}

pub fn alice() -> ParticipantId {
    ParticipantId::from_seed("alice")
}

pub fn bob() -> ParticipantId {
    ParticipantId::from_seed("bob")
}

pub fn eth() -> AssetId {
    AssetId::from_seed("ETH")
}

pub fn eth_feed() -> FeedId {
    FeedId::from_seed("ETH/USD")
}

pub fn sol() -> AssetId {
    AssetId::from_seed("SOL")
}

pub fn sol_feed() -> FeedId {
    FeedId::from_seed("SOL/USD")
}

/// Two registered assets: ETH (9 decimals, $2000) and SOL (9 decimals,
/// $100); default risk parameters (50% threshold, 10% bonus, 30s bound)
pub fn testbed() -> TestBed {
    let oracle = Arc::new(StaticOracle::new());
    oracle.set_price(eth_feed(), 2_000, 0);
    oracle.set_price(sol_feed(), 100, 0);

    let custody = Arc::new(WalletCustody::new());
    let issuer = Arc::new(SupplyIssuer::new());

    let engine = CollateralEngine::new(
        EngineConfig::default(),
        vec![eth(), sol()],
        vec![eth_feed(), sol_feed()],
        vec![9, 9],
        oracle.clone(),
        custody.clone(),
        issuer.clone(),
    )
    .expect("testbed engine construction");

    TestBed {
        engine: Arc::new(engine),
        oracle,
        custody,
        issuer,
    }
}

/// One whole token at 9 decimals
pub const UNIT: u128 = 1_000_000_000;

/// One whole kUSD (6 decimals)
pub const KUSD: u128 = 1_000_000;
