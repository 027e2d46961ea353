//! Algod REST client
//!
//! The slice of the algod v2 API the tip jar needs: suggested parameters,
//! raw transaction submission and confirmation polling.

use crate::wallet::provider::ProviderError;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const TOKEN_HEADER: &str = "X-Algo-API-Token";

/// Configuration for the algod client
#[derive(Debug, Clone)]
pub struct AlgodConfig {
    /// Base URL (e.g., "https://testnet-api.algonode.cloud")
    pub server: String,
    /// API token; public nodes accept an empty token
    pub token: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Rounds to wait for a confirmation
    pub confirmation_rounds: u64,
}

impl Default for AlgodConfig {
    fn default() -> Self {
        Self {
            server: "https://testnet-api.algonode.cloud".to_string(),
            token: String::new(),
            request_timeout_ms: 10_000,
            confirmation_rounds: 4,
        }
    }
}

/// Suggested transaction parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SuggestedParams {
    pub fee: u64,
    pub min_fee: u64,
    pub genesis_hash: String,
    pub genesis_id: String,
    pub last_round: u64,
    #[serde(default)]
    pub consensus_version: String,
}

/// Pool state of a submitted transaction
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PendingTransaction {
    #[serde(default)]
    pub confirmed_round: Option<u64>,
    #[serde(default)]
    pub pool_error: String,
}

/// Node status
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NodeStatus {
    pub last_round: u64,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(rename = "txId")]
    tx_id: String,
}

/// algod v2 REST client
pub struct AlgodClient {
    client: Client,
    config: AlgodConfig,
}

impl AlgodClient {
    pub fn new(config: AlgodConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.server.trim_end_matches('/'), path)
    }

    fn with_token(&self, request: RequestBuilder) -> RequestBuilder {
        if self.config.token.is_empty() {
            request
        } else {
            request.header(TOKEN_HEADER, &self.config.token)
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let response = self
            .with_token(self.client.get(self.url(path)))
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(e, &self.config.server))?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }

    /// Fetch suggested parameters for a new transaction
    pub async fn suggested_params(&self) -> Result<SuggestedParams, ProviderError> {
        self.get_json("/v2/transactions/params").await
    }

    /// Current node status
    pub async fn status(&self) -> Result<NodeStatus, ProviderError> {
        self.get_json("/v2/status").await
    }

    /// Block until the node has seen the round after `round`
    pub async fn wait_for_block_after(&self, round: u64) -> Result<NodeStatus, ProviderError> {
        self.get_json(&format!("/v2/status/wait-for-block-after/{}", round))
            .await
    }

    /// Pool state of a transaction
    pub async fn pending(&self, tx_id: &str) -> Result<PendingTransaction, ProviderError> {
        self.get_json(&format!(
            "/v2/transactions/pending/{}",
            urlencoding::encode(tx_id)
        ))
        .await
    }

    /// Submit a signed transaction; returns its id
    pub async fn send_raw(&self, signed: Vec<u8>) -> Result<String, ProviderError> {
        let response = self
            .with_token(self.client.post(self.url("/v2/transactions")))
            .header(reqwest::header::CONTENT_TYPE, "application/x-binary")
            .body(signed)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(e, &self.config.server))?;

        let submitted: SubmitResponse = Self::decode(response).await?;
        Ok(submitted.tx_id)
    }

    /// Poll until `tx_id` is confirmed or the configured number of rounds
    /// has passed. Returns the confirmed round.
    pub async fn wait_for_confirmation(&self, tx_id: &str) -> Result<u64, ProviderError> {
        let rounds = self.config.confirmation_rounds;
        let start = self.status().await?.last_round;
        let mut current = start;

        while current < start + rounds {
            let pending = self.pending(tx_id).await?;

            if let Some(round) = pending.confirmed_round.filter(|r| *r > 0) {
                tracing::info!(tx_id, round, "Transaction confirmed");
                return Ok(round);
            }
            if !pending.pool_error.is_empty() {
                return Err(ProviderError::Pool(pending.pool_error));
            }

            self.wait_for_block_after(current).await?;
            current += 1;
        }

        Err(ProviderError::NotConfirmed {
            tx_id: tx_id.to_string(),
            rounds,
        })
    }
}
