//! Identifier types and fixed-point scales

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// USD fixed-point scale (1e6, micro-dollars)
pub const USD_SCALE: u128 = 1_000_000;

/// Health factor fixed-point scale (1e6)
pub const HEALTH_SCALE: u128 = 1_000_000;

/// Minimum safe health factor (1.0 at `HEALTH_SCALE`); anything below is liquidatable
pub const MIN_HEALTH_FACTOR: u128 = HEALTH_SCALE;

/// Basis point denominator (10_000 = 100%)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Decimals of the issued debt asset (kUSD); base units at this scale
/// coincide with `USD_SCALE` values
pub const DEBT_DECIMALS: u32 = 6;

/// Failure to parse a 32-byte id from its base58 form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error("invalid base58 encoding")]
    BadEncoding,
    #[error("decoded id is {0} bytes, expected 32")]
    BadLength(usize),
}

fn decode_id(s: &str) -> Result<[u8; 32], IdParseError> {
    let bytes = bs58::decode(s)
        .into_vec()
        .map_err(|_| IdParseError::BadEncoding)?;
    if bytes.len() != 32 {
        return Err(IdParseError::BadLength(bytes.len()));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

fn seed_id(seed: &str) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    let n = seed.len().min(32);
    bytes[..n].copy_from_slice(&seed.as_bytes()[..n]);
    bytes
}

/// Opaque 32-byte participant identity
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(pub [u8; 32]);

impl ParticipantId {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive an id from a short ASCII seed (tests and local config)
    pub fn from_seed(seed: &str) -> Self {
        Self(seed_id(seed))
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(&self.0).into_string())
    }
}

impl fmt::Debug for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParticipantId({})", self)
    }
}

impl FromStr for ParticipantId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_id(s).map(Self)
    }
}

impl Serialize for ParticipantId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ParticipantId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Opaque 32-byte collateral asset identity
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub [u8; 32]);

impl AssetId {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive an id from a short ASCII seed (tests and local config)
    pub fn from_seed(seed: &str) -> Self {
        Self(seed_id(seed))
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(&self.0).into_string())
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self)
    }
}

impl FromStr for AssetId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_id(s).map(Self)
    }
}

impl Serialize for AssetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AssetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Opaque 32-byte price feed identity (one per registered asset)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeedId(pub [u8; 32]);

impl FeedId {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive an id from a short ASCII seed (tests and local config)
    pub fn from_seed(seed: &str) -> Self {
        Self(seed_id(seed))
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(&self.0).into_string())
    }
}

impl fmt::Debug for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeedId({})", self)
    }
}

impl FromStr for FeedId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_id(s).map(Self)
    }
}

impl Serialize for FeedId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FeedId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
