//! Wallet provider contract
//!
//! A provider discovers the user's address and turns a payment request into
//! a confirmed transaction id. The tip jar never signs anything itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

/// Which kind of provider produced a session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Locally fabricated addresses and transaction ids
    Demo,
    /// A real wallet plus an algod node
    External,
}

impl ProviderKind {
    /// Tag persisted alongside the session
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Demo => "demo",
            ProviderKind::External => "external",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "demo" | "mock" => Ok(ProviderKind::Demo),
            "external" | "pera" | "wallet" => Ok(ProviderKind::External),
            other => Err(format!("unknown wallet provider: {}", other)),
        }
    }
}

/// A payment to be signed and broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRequest {
    /// Sender address (the connected wallet)
    pub from: String,
    /// Recipient address
    pub to: String,
    /// Amount in micro-units
    pub amount: u64,
    /// Free-form transaction note
    pub note: String,
}

/// Emitted by a provider when the wallet ends the session on its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectEvent {
    pub reason: String,
}

/// Common trait for wallet providers
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Tag identifying this provider
    fn kind(&self) -> ProviderKind;

    /// Discover and authorize an address
    async fn connect(&self) -> Result<String, ProviderError>;

    /// Sign, broadcast and confirm a payment; returns the transaction id
    async fn send_payment(&self, payment: &PaymentRequest) -> Result<String, ProviderError>;

    /// End the wallet session
    async fn disconnect(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    /// Channel of provider-driven disconnects, if the provider has one
    fn disconnect_events(&self) -> Option<broadcast::Receiver<DisconnectEvent>> {
        None
    }
}

/// Errors raised by a wallet provider or the node behind it
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Wallet provider unavailable: {0}")]
    Unavailable(String),

    #[error("Wallet rejected the request: {0}")]
    Rejected(String),

    #[error("Wallet returned no accounts")]
    NoAccounts,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Request timeout")]
    Timeout,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Transaction rejected by pool: {0}")]
    Pool(String),

    #[error("Transaction {tx_id} not confirmed after {rounds} rounds")]
    NotConfirmed { tx_id: String, rounds: u64 },

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Classify a transport error the way the HTTP clients report it
    pub fn from_transport(err: reqwest::Error, target: &str) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_connect() {
            ProviderError::Unavailable(target.to_string())
        } else {
            ProviderError::Request(err)
        }
    }
}
