//! Record types persisted by the tip jar
//!
//! This module defines the three record collections kept in the local store:
//! - `CreatorProfile`: a creator page, keyed by wallet
//! - `SupporterProfile`: a supporter page, keyed by wallet
//! - `TipRecord`: a single confirmed tip
//!
//! Field names serialize in camelCase so stores written by the browser site
//! stay readable.

use chrono::Utc;
use serde::{de, Deserialize, Deserializer, Serialize};

/// Micro-units per ALGO. Tip amounts are stored as integers in micro-units.
pub const MICRO_ALGOS_PER_ALGO: u64 = 1_000_000;

/// Avatar used when a creator leaves the field empty
pub const DEFAULT_AVATAR_URL: &str = "https://via.placeholder.com/150";

/// Convert a micro-unit amount to ALGO
pub fn micro_to_algo(amount: u64) -> f64 {
    amount as f64 / MICRO_ALGOS_PER_ALGO as f64
}

/// Convert an ALGO amount to micro-units, rounding to the nearest unit
///
/// Returns `None` for negative, non-finite or overflowing values.
pub fn algo_to_micro(amount: f64) -> Option<u64> {
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }
    let micro = (amount * MICRO_ALGOS_PER_ALGO as f64).round();
    if micro > u64::MAX as f64 {
        return None;
    }
    Some(micro as u64)
}

/// Current time as Unix milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// A creator profile page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatorProfile {
    /// Wallet address, the unique key
    pub wallet: String,
    pub name: String,
    pub category: String,
    pub bio: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub portfolio: Vec<String>,
    /// Unix timestamp in milliseconds
    #[serde(default)]
    pub created_at: i64,
}

impl CreatorProfile {
    /// Create a profile with the current timestamp and the default avatar
    pub fn new(
        wallet: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        bio: impl Into<String>,
    ) -> Self {
        Self {
            wallet: wallet.into(),
            name: name.into(),
            category: category.into(),
            bio: bio.into(),
            avatar_url: DEFAULT_AVATAR_URL.to_string(),
            portfolio: Vec::new(),
            created_at: now_millis(),
        }
    }

    /// Builder: set avatar URL
    pub fn avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = url.into();
        self
    }

    /// Builder: append a portfolio item
    pub fn portfolio_item(mut self, url: impl Into<String>) -> Self {
        self.portfolio.push(url.into());
        self
    }

    /// Builder: set creation time
    pub fn created_at(mut self, timestamp: i64) -> Self {
        self.created_at = timestamp;
        self
    }
}

/// A supporter (tipper) profile page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SupporterProfile {
    /// Wallet address, the unique key
    pub wallet: String,
    pub display_name: String,
    pub bio: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub social_media: Option<String>,
    /// Unix timestamp in milliseconds
    #[serde(default)]
    pub created_at: i64,
}

impl SupporterProfile {
    pub fn new(
        wallet: impl Into<String>,
        display_name: impl Into<String>,
        bio: impl Into<String>,
    ) -> Self {
        Self {
            wallet: wallet.into(),
            display_name: display_name.into(),
            bio: bio.into(),
            avatar_url: None,
            social_media: None,
            created_at: now_millis(),
        }
    }

    /// Builder: set social media link
    pub fn social(mut self, url: impl Into<String>) -> Self {
        self.social_media = Some(url.into());
        self
    }

    /// Builder: set avatar (usually a `data:image/...` URL)
    pub fn avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    /// Builder: set creation time
    pub fn created_at(mut self, timestamp: i64) -> Self {
        self.created_at = timestamp;
        self
    }

    /// Avatar only when it is an inline image
    pub fn inline_avatar(&self) -> Option<&str> {
        self.avatar_url
            .as_deref()
            .filter(|url| url.starts_with("data:image"))
    }
}

/// Read a micro-unit amount. The browser site stores `algo * 1e6` as a
/// float (1.1 ALGO is `1100000.0000000002`), so non-negative finite floats
/// are rounded to the nearest unit. Integers are taken exactly.
fn deserialize_micro<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Exact(u64),
        Float(f64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Exact(amount) => Ok(amount),
        Raw::Float(amount) if amount.is_finite() && amount >= 0.0 => Ok(amount.round() as u64),
        Raw::Float(amount) => Err(de::Error::custom(format!("invalid tip amount {}", amount))),
    }
}

/// A single tip, append-only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TipRecord {
    /// Sender wallet
    pub from: String,
    /// Recipient wallet
    pub to: String,
    /// Amount in micro-units
    #[serde(deserialize_with = "deserialize_micro")]
    pub amount: u64,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Confirmation identifier; not guaranteed unique
    pub tx_id: String,
}

impl TipRecord {
    /// Create a tip stamped with the current time
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        amount: u64,
        tx_id: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
            timestamp: now_millis(),
            tx_id: tx_id.into(),
        }
    }

    /// Builder: set timestamp
    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Amount in ALGO
    pub fn algo(&self) -> f64 {
        micro_to_algo(self.amount)
    }
}
