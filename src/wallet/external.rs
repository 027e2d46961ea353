//! External provider
//!
//! Pairs a wallet connector (accounts and signatures) with an algod node
//! (parameters, broadcast, confirmation). Failures propagate unchanged; there
//! is no retry.

use crate::wallet::algod::AlgodClient;
use crate::wallet::bridge::WalletConnector;
use crate::wallet::provider::{
    DisconnectEvent, PaymentRequest, ProviderError, ProviderKind, WalletProvider,
};
use async_trait::async_trait;
use tokio::sync::broadcast;

pub struct ExternalProvider {
    algod: AlgodClient,
    connector: Box<dyn WalletConnector>,
}

impl ExternalProvider {
    pub fn new(algod: AlgodClient, connector: Box<dyn WalletConnector>) -> Self {
        Self { algod, connector }
    }
}

#[async_trait]
impl WalletProvider for ExternalProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::External
    }

    async fn connect(&self) -> Result<String, ProviderError> {
        let accounts = self.connector.accounts().await?;
        let address = accounts.into_iter().next().ok_or(ProviderError::NoAccounts)?;
        tracing::info!(address = %address, "Wallet authorized");
        Ok(address)
    }

    async fn send_payment(&self, payment: &PaymentRequest) -> Result<String, ProviderError> {
        let params = self.algod.suggested_params().await?;
        tracing::debug!(last_round = params.last_round, "Fetched suggested params");

        let signed = self.connector.sign(payment, &params).await?;
        let tx_id = self.algod.send_raw(signed).await?;
        tracing::info!(tx_id = %tx_id, "Transaction submitted");

        self.algod.wait_for_confirmation(&tx_id).await?;
        Ok(tx_id)
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        self.connector.disconnect().await
    }

    fn disconnect_events(&self) -> Option<broadcast::Receiver<DisconnectEvent>> {
        Some(self.connector.disconnect_events())
    }
}
