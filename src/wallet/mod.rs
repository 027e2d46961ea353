//! Wallet Providers and Session
//!
//! - **provider**: The provider contract (connect, pay, disconnect events)
//! - **demo**: Local provider with fabricated addresses and ids
//! - **algod**: algod REST client (params, broadcast, confirmation)
//! - **bridge**: Wallet connectors, including the HTTP wallet bridge
//! - **external**: Provider pairing a connector with an algod node
//! - **session**: The connected-wallet session
//!
//! The provider is chosen once at startup from configuration; see
//! [`build_provider`].

mod algod;
mod bridge;
mod demo;
mod external;
mod provider;
mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use algod::{AlgodClient, AlgodConfig, NodeStatus, PendingTransaction, SuggestedParams};
pub use bridge::{BridgeConfig, BridgeConnector, UnsignedPayment, WalletConnector};
pub use demo::{
    generate_address, generate_demo_profile_wallet, generate_tx_id, is_address_like,
    DemoProvider, ADDRESS_ALPHABET, ADDRESS_LEN,
};
pub use external::ExternalProvider;
pub use provider::{DisconnectEvent, PaymentRequest, ProviderError, ProviderKind, WalletProvider};
pub use session::{SessionError, SessionEvent, WalletHandle, WalletSession};

use crate::config::Config;
use crate::store::RecordStore;
use std::sync::Arc;

/// Build the provider selected by `config.wallet.provider`
pub fn build_provider(
    config: &Config,
    store: &RecordStore,
) -> Result<Arc<dyn WalletProvider>, ProviderError> {
    match config.wallet.provider {
        ProviderKind::Demo => {
            tracing::info!("Using demo wallet provider");
            Ok(Arc::new(DemoProvider::new(store.clone())))
        }
        ProviderKind::External => {
            let network = config.network.active();
            tracing::info!(
                network = %config.network.name,
                algod = %network.algod_server,
                bridge = %config.wallet.bridge_url,
                "Using external wallet provider"
            );

            let algod = AlgodClient::new(AlgodConfig {
                server: network.algod_server.clone(),
                token: network.algod_token.clone(),
                request_timeout_ms: config.wallet.request_timeout_ms,
                confirmation_rounds: config.wallet.confirmation_rounds,
            })?;
            let connector = BridgeConnector::new(BridgeConfig {
                url: config.wallet.bridge_url.clone(),
                request_timeout_ms: config.wallet.sign_timeout_ms,
            })?;

            Ok(Arc::new(ExternalProvider::new(algod, Box::new(connector))))
        }
    }
}
