//! Keeper configuration

use anyhow::{Context, Result};
use krona_engine::{AssetId, FeedId, ParticipantId};
use serde::{Deserialize, Serialize};

/// One accepted collateral asset plus the static price seed the
/// standalone binary feeds its local oracle with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    pub asset: AssetId,
    pub feed: FeedId,
    pub decimals: u32,
    /// `price * 10^-expo` USD per whole token
    pub price: i64,
    pub expo: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Keeper identity that funds the forced repays
    pub keeper_id: ParticipantId,

    /// Polling interval in seconds
    pub poll_interval_secs: u64,

    /// Maximum liquidations per batch
    pub max_liquidations_per_batch: usize,

    /// Share of a target's outstanding debt to cover per call (basis points)
    pub close_factor_bps: u64,

    /// Engine risk parameters
    pub liquidation_threshold_bps: u64,
    pub liquidation_bonus_bps: u64,

    /// Oracle quote freshness bound in seconds (absent disables the check)
    pub max_quote_age_secs: Option<u64>,

    /// Accepted collateral assets
    pub assets: Vec<AssetConfig>,
}

impl Config {
    /// Load configuration from TOML file
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var("KEEPER_CONFIG").unwrap_or_else(|_| "keeper-config.toml".to_string());

        let config_str = std::fs::read_to_string(&config_path)
            .context(format!("Failed to read config file: {}", config_path))?;

        let config: Config = toml::from_str(&config_str).context("Failed to parse config TOML")?;

        Ok(config)
    }

    /// Create default configuration for a local run
    pub fn default_local() -> Self {
        Self {
            keeper_id: ParticipantId::from_seed("keeper"),
            poll_interval_secs: 1,
            max_liquidations_per_batch: 5,
            close_factor_bps: 5_000, // cover half the debt per call
            liquidation_threshold_bps: 5_000,
            liquidation_bonus_bps: 1_000,
            max_quote_age_secs: Some(30),
            assets: vec![AssetConfig {
                asset: AssetId::from_seed("SOL"),
                feed: FeedId::from_seed("SOL/USD"),
                decimals: 9,
                price: 100,
                expo: 0,
            }],
        }
    }

    /// Write default config to file
    pub fn write_default(path: &str) -> Result<()> {
        let config = Self::default_local();
        let toml_str = toml::to_string_pretty(&config).context("Failed to serialize config")?;

        std::fs::write(path, toml_str).context(format!("Failed to write config to {}", path))?;

        log::info!("Created default config at {}", path);
        Ok(())
    }
}
