//! Accepted-collateral registry with oracle bindings

use std::collections::HashMap;

use crate::error::EngineError;
use crate::types::{AssetId, FeedId};

/// One accepted collateral asset and its price feed binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetEntry {
    /// Collateral asset id
    pub asset: AssetId,
    /// Price feed bound to the asset
    pub feed: FeedId,
    /// Base-unit decimals of the asset
    pub decimals: u32,
}

/// Construction-time registry: an ordered entry list for deterministic
/// iteration during aggregate valuation, with a companion index map
#[derive(Debug)]
pub struct AssetRegistry {
    entries: Vec<AssetEntry>,
    index: HashMap<AssetId, usize>,
}

impl AssetRegistry {
    /// Build from parallel lists; every asset gets exactly one feed binding
    pub fn new(
        assets: Vec<AssetId>,
        feeds: Vec<FeedId>,
        decimals: Vec<u32>,
    ) -> Result<Self, EngineError> {
        if assets.len() != feeds.len() || assets.len() != decimals.len() {
            return Err(EngineError::MismatchedFeedConfig {
                assets: assets.len(),
                feeds: feeds.len(),
                decimals: decimals.len(),
            });
        }

        let mut entries = Vec::with_capacity(assets.len());
        let mut index = HashMap::with_capacity(assets.len());

        for (i, ((asset, feed), decimals)) in assets
            .into_iter()
            .zip(feeds.into_iter())
            .zip(decimals.into_iter())
            .enumerate()
        {
            if index.insert(asset, i).is_some() {
                return Err(EngineError::DuplicateAsset(asset));
            }
            entries.push(AssetEntry {
                asset,
                feed,
                decimals,
            });
        }

        Ok(Self { entries, index })
    }

    /// Entry for `asset`, if registered
    pub fn get(&self, asset: &AssetId) -> Option<&AssetEntry> {
        self.index.get(asset).map(|&i| &self.entries[i])
    }

    /// Entry for `asset`, or the typed rejection
    pub fn require(&self, asset: &AssetId) -> Result<&AssetEntry, EngineError> {
        self.get(asset)
            .ok_or(EngineError::UnregisteredAsset(*asset))
    }

    /// All entries in registration order
    pub fn entries(&self) -> &[AssetEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
