//! # Tip Jar
//!
//! Creator Tip Jar - tip creators in ALGO, keep supporter profiles, and show
//! totals, leaderboards and dashboards from a local record store.
//!
//! ## Modules
//!
//! - [`store`]: Local record store (creators, supporters, tips, session)
//! - [`queries`]: Aggregations over the tip log
//! - [`wallet`]: Wallet providers and the connected-wallet session
//! - [`tips`]: Sending tips through the session's provider
//! - [`views`]: Page view models for the CLI
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tipjar::store::RecordStore;
//! use tipjar::tips::TipSender;
//! use tipjar::wallet::{DemoProvider, WalletProvider, WalletSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = RecordStore::in_memory();
//!     let provider: Arc<dyn WalletProvider> = Arc::new(DemoProvider::new(store.clone()));
//!
//!     let session = WalletSession::init(store.clone(), provider).await;
//!     session.connect().await?;
//!
//!     let sender = TipSender::new(store.clone());
//!     let tip = sender.send(&session, "CREATOR_WALLET", 5.0).await?;
//!     println!("Sent {} ALGO ({})", tip.algo(), tip.tx_id);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod queries;
pub mod store;
pub mod tips;
pub mod views;
pub mod wallet;

// Re-export top-level types for convenience
pub use config::{AppConfig, Config, ConfigError, LoggingConfig, Network, NetworkConfig, StoreConfig, WalletConfig};

pub use store::{
    CreatorProfile, FileBackend, KeyValueBackend, MemoryBackend, RecordStore, StoreError,
    StoreResult, SupporterProfile, TipRecord,
};

pub use queries::{CreatorStats, LeaderboardEntry, SupporterStats};

pub use tips::{TipError, TipLimits, TipSender};

pub use wallet::{
    build_provider, PaymentRequest, ProviderError, ProviderKind, SessionError, SessionEvent,
    WalletHandle, WalletProvider, WalletSession,
};

pub use views::{DashboardView, FormError, Notice, ProfileView, SupporterProfileView};
