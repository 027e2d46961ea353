//! Record store
//!
//! CRUD over the three record collections plus the persisted wallet session.
//! Every collection is a JSON array under one key. Reads never fail: an
//! absent key or a value that is not a JSON array reads as empty, and array
//! elements that do not match the record schema are dropped one by one.

use crate::store::backend::KeyValueBackend;
use crate::store::error::StoreResult;
use crate::store::types::{CreatorProfile, SupporterProfile, TipRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Storage keys
pub mod keys {
    pub const CREATORS: &str = "creators";
    pub const SUPPORTERS: &str = "supporters";
    pub const TIPS: &str = "tips";
    pub const CONNECTED_WALLET: &str = "connectedWallet";
    pub const WALLET_TYPE: &str = "walletType";
    /// Fabricated demo address, kept across disconnects
    pub const DEMO_WALLET: &str = "mockWallet";
}

/// Records keyed by wallet address
trait Keyed {
    fn wallet(&self) -> &str;
}

impl Keyed for CreatorProfile {
    fn wallet(&self) -> &str {
        &self.wallet
    }
}

impl Keyed for SupporterProfile {
    fn wallet(&self) -> &str {
        &self.wallet
    }
}

/// Persisted session as last written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub wallet: String,
    pub provider: String,
}

/// Record store over a key-value backend
#[derive(Clone)]
pub struct RecordStore {
    backend: Arc<dyn KeyValueBackend>,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore").finish_non_exhaustive()
    }
}

impl RecordStore {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// Store over a fresh in-memory backend
    pub fn in_memory() -> Self {
        Self::new(Arc::new(crate::store::backend::MemoryBackend::new()))
    }

    // ---- creators ----

    /// Insert or replace the creator with the same wallet
    pub fn upsert_creator(&self, profile: CreatorProfile) -> StoreResult<()> {
        self.upsert(keys::CREATORS, profile)
    }

    pub fn get_creator(&self, wallet: &str) -> Option<CreatorProfile> {
        self.list_creators().into_iter().find(|c| c.wallet == wallet)
    }

    pub fn list_creators(&self) -> Vec<CreatorProfile> {
        self.read_collection(keys::CREATORS)
    }

    // ---- supporters ----

    /// Insert or replace the supporter with the same wallet
    pub fn upsert_supporter(&self, profile: SupporterProfile) -> StoreResult<()> {
        self.upsert(keys::SUPPORTERS, profile)
    }

    pub fn get_supporter(&self, wallet: &str) -> Option<SupporterProfile> {
        self.list_supporters()
            .into_iter()
            .find(|s| s.wallet == wallet)
    }

    pub fn list_supporters(&self) -> Vec<SupporterProfile> {
        self.read_collection(keys::SUPPORTERS)
    }

    // ---- tips ----

    /// Append a tip. No dedup and no check that either wallet has a profile.
    pub fn append_tip(&self, record: TipRecord) -> StoreResult<()> {
        let mut tips: Vec<TipRecord> = self.read_collection(keys::TIPS);
        tracing::debug!(tx_id = %record.tx_id, to = %record.to, amount = record.amount, "Appending tip");
        tips.push(record);
        self.write_collection(keys::TIPS, &tips)
    }

    pub fn list_tips(&self) -> Vec<TipRecord> {
        self.read_collection(keys::TIPS)
    }

    // ---- session ----

    /// Persisted session, if both the wallet and the provider tag are present
    pub fn load_session(&self) -> Option<StoredSession> {
        let wallet = self.backend.get(keys::CONNECTED_WALLET)?;
        let provider = self.backend.get(keys::WALLET_TYPE)?;
        Some(StoredSession { wallet, provider })
    }

    pub fn save_session(&self, wallet: &str, provider: &str) -> StoreResult<()> {
        self.backend.set(keys::CONNECTED_WALLET, wallet.to_string())?;
        self.backend.set(keys::WALLET_TYPE, provider.to_string())
    }

    pub fn clear_session(&self) -> StoreResult<()> {
        self.backend.remove(keys::CONNECTED_WALLET)?;
        self.backend.remove(keys::WALLET_TYPE)
    }

    pub fn demo_wallet(&self) -> Option<String> {
        self.backend
            .get(keys::DEMO_WALLET)
            .filter(|w| !w.is_empty())
    }

    pub fn save_demo_wallet(&self, wallet: &str) -> StoreResult<()> {
        self.backend.set(keys::DEMO_WALLET, wallet.to_string())
    }

    // ---- internals ----

    fn upsert<T>(&self, key: &str, record: T) -> StoreResult<()>
    where
        T: Keyed + Serialize + DeserializeOwned,
    {
        let mut records: Vec<T> = self.read_collection(key);
        match records.iter().position(|r| r.wallet() == record.wallet()) {
            Some(index) => {
                tracing::debug!(key, wallet = %record.wallet(), "Replacing record");
                records[index] = record;
            }
            None => {
                tracing::debug!(key, wallet = %record.wallet(), "Inserting record");
                records.push(record);
            }
        }
        self.write_collection(key, &records)
    }

    fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let Some(raw) = self.backend.get(key) else {
            return Vec::new();
        };

        let values: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(key, "Stored collection is unreadable, treating as empty: {}", e);
                return Vec::new();
            }
        };

        let total = values.len();
        let records: Vec<T> = values
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(key, "Dropping invalid record: {}", e);
                    None
                }
            })
            .collect();

        if records.len() < total {
            tracing::warn!(key, dropped = total - records.len(), kept = records.len(), "Invalid records dropped");
        }

        records
    }

    fn write_collection<T: Serialize>(&self, key: &str, records: &[T]) -> StoreResult<()> {
        let raw = serde_json::to_string(records)?;
        self.backend.set(key, raw)
    }
}
