//! Tip Jar Record Store
//!
//! This module provides local persistence for the tip jar:
//!
//! - **types**: Record structures (CreatorProfile, SupporterProfile, TipRecord)
//! - **backend**: String key-value backends (file, memory)
//! - **records**: The record store over a backend
//! - **error**: Error types
//!
//! # Layout
//!
//! ```text
//! creators        → JSON array of CreatorProfile
//! supporters      → JSON array of SupporterProfile
//! tips            → JSON array of TipRecord
//! connectedWallet → session address
//! walletType      → provider tag ("demo" | "external")
//! mockWallet      → fabricated demo address
//! ```
//!
//! # Example
//!
//! ```rust
//! use tipjar::store::{CreatorProfile, RecordStore, TipRecord};
//!
//! let store = RecordStore::in_memory();
//! store.upsert_creator(CreatorProfile::new("CREATOR", "Ada", "Artist", "Paints")).unwrap();
//! store.append_tip(TipRecord::new("FAN", "CREATOR", 5_000_000, "TXN1")).unwrap();
//!
//! assert_eq!(store.list_tips().len(), 1);
//! ```

pub mod backend;
pub mod error;
pub mod records;
pub mod types;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use error::{StoreError, StoreResult};
pub use records::{keys, RecordStore, StoredSession};
pub use types::{
    algo_to_micro, micro_to_algo, now_millis, CreatorProfile, SupporterProfile, TipRecord,
    DEFAULT_AVATAR_URL, MICRO_ALGOS_PER_ALGO,
};
