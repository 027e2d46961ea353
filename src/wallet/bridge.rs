//! Wallet connectors
//!
//! A connector is the wallet half of the external provider: it owns the
//! keys, hands out accounts and signs payments. [`BridgeConnector`] talks to
//! a local wallet bridge over HTTP:
//!
//! ```text
//! POST /connect     → {"accounts": ["ADDR", ...]}
//! POST /sign        {"txn": {...}} → {"signedTxn": "<base64>"}
//! POST /disconnect  → 2xx
//! ```
//!
//! A 401 or 410 from the bridge means the wallet ended the session; the
//! connector publishes a [`DisconnectEvent`] before failing the call.

use crate::wallet::algod::SuggestedParams;
use crate::wallet::provider::{DisconnectEvent, PaymentRequest, ProviderError};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::broadcast;

/// Rounds a signed payment stays valid for
pub const VALIDITY_ROUNDS: u64 = 1000;

/// Wallet side of an external provider
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Ask the wallet for authorized accounts
    async fn accounts(&self) -> Result<Vec<String>, ProviderError>;

    /// Sign a payment built on `params`; returns the signed transaction bytes
    async fn sign(
        &self,
        payment: &PaymentRequest,
        params: &SuggestedParams,
    ) -> Result<Vec<u8>, ProviderError>;

    /// End the wallet session
    async fn disconnect(&self) -> Result<(), ProviderError>;

    /// Disconnects initiated by the wallet
    fn disconnect_events(&self) -> broadcast::Receiver<DisconnectEvent>;
}

/// Configuration for the HTTP wallet bridge
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Base URL (e.g., "http://127.0.0.1:8420")
    pub url: String,
    /// Request timeout in milliseconds. Signing waits on the user.
    pub request_timeout_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8420".to_string(),
            request_timeout_ms: 120_000,
        }
    }
}

/// Unsigned payment as sent to the bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedPayment {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub from: String,
    pub to: String,
    pub amount: u64,
    /// Base64 of the note bytes
    pub note: String,
    pub fee: u64,
    pub first_round: u64,
    pub last_round: u64,
    pub genesis_id: String,
    pub genesis_hash: String,
}

impl UnsignedPayment {
    pub fn build(payment: &PaymentRequest, params: &SuggestedParams) -> Self {
        Self {
            kind: "pay",
            from: payment.from.clone(),
            to: payment.to.clone(),
            amount: payment.amount,
            note: STANDARD.encode(payment.note.as_bytes()),
            fee: params.fee.max(params.min_fee),
            first_round: params.last_round,
            last_round: params.last_round + VALIDITY_ROUNDS,
            genesis_id: params.genesis_id.clone(),
            genesis_hash: params.genesis_hash.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SignRequest<'a> {
    txn: &'a UnsignedPayment,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignResponse {
    signed_txn: String,
}

#[derive(Debug, Deserialize)]
struct ConnectResponse {
    #[serde(default)]
    accounts: Vec<String>,
}

/// HTTP wallet bridge client
pub struct BridgeConnector {
    client: Client,
    config: BridgeConfig,
    events: broadcast::Sender<DisconnectEvent>,
}

impl BridgeConnector {
    pub fn new(config: BridgeConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        let (events, _) = broadcast::channel(16);

        Ok(Self {
            client,
            config,
            events,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Response, ProviderError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(e, &self.config.url))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::GONE => {
                tracing::warn!(status = status.as_u16(), "Wallet bridge ended the session");
                // No receivers is fine
                let _ = self.events.send(DisconnectEvent {
                    reason: if message.is_empty() {
                        "wallet session ended".to_string()
                    } else {
                        message.clone()
                    },
                });
                Err(ProviderError::Rejected(message))
            }
            s if s.is_client_error() => Err(ProviderError::Rejected(message)),
            s => Err(ProviderError::Api {
                status: s.as_u16(),
                message,
            }),
        }
    }
}

#[async_trait]
impl WalletConnector for BridgeConnector {
    async fn accounts(&self) -> Result<Vec<String>, ProviderError> {
        let response = self.post("/connect", &serde_json::json!({})).await?;
        let body: ConnectResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        Ok(body.accounts)
    }

    async fn sign(
        &self,
        payment: &PaymentRequest,
        params: &SuggestedParams,
    ) -> Result<Vec<u8>, ProviderError> {
        let txn = UnsignedPayment::build(payment, params);
        let response = self.post("/sign", &SignRequest { txn: &txn }).await?;
        let body: SignResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        STANDARD
            .decode(body.signed_txn.as_bytes())
            .map_err(|e| ProviderError::Decode(format!("signed transaction: {}", e)))
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        self.post("/disconnect", &serde_json::json!({})).await?;
        Ok(())
    }

    fn disconnect_events(&self) -> broadcast::Receiver<DisconnectEvent> {
        self.events.subscribe()
    }
}
