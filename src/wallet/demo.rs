//! Demo provider
//!
//! Runs without a wallet or a node. Addresses and transaction ids are
//! fabricated locally and every payment succeeds immediately.

use crate::store::RecordStore;
use crate::wallet::provider::{PaymentRequest, ProviderError, ProviderKind, WalletProvider};
use async_trait::async_trait;
use rand::Rng;

/// Alphabet of Algorand addresses (RFC 4648 base32, no padding)
pub const ADDRESS_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Length of an Algorand address
pub const ADDRESS_LEN: usize = 58;

const BASE36_UPPER: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

fn random_from(alphabet: &[u8], len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

/// Fabricate a random 58-character address
pub fn generate_address() -> String {
    random_from(ADDRESS_ALPHABET, ADDRESS_LEN)
}

/// Fabricate a transaction id: `TXN` followed by 13 base-36 characters
pub fn generate_tx_id() -> String {
    format!("TXN{}", random_from(BASE36_UPPER, 13))
}

/// Placeholder wallet for demo profiles when nothing is connected
pub fn generate_demo_profile_wallet() -> String {
    format!("DEMO{}", random_from(BASE36_UPPER, 13))
}

/// True when `s` has the shape of an address this provider would generate
pub fn is_address_like(s: &str) -> bool {
    s.len() == ADDRESS_LEN && s.bytes().all(|b| ADDRESS_ALPHABET.contains(&b))
}

/// Provider that never leaves the machine
pub struct DemoProvider {
    store: RecordStore,
}

impl DemoProvider {
    /// The store keeps the fabricated address so reconnects return it again
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl WalletProvider for DemoProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Demo
    }

    async fn connect(&self) -> Result<String, ProviderError> {
        if let Some(address) = self.store.demo_wallet() {
            return Ok(address);
        }

        let address = generate_address();
        self.store
            .save_demo_wallet(&address)
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        tracing::info!(address = %address, "Fabricated demo wallet");
        Ok(address)
    }

    async fn send_payment(&self, payment: &PaymentRequest) -> Result<String, ProviderError> {
        let tx_id = generate_tx_id();
        tracing::debug!(tx_id = %tx_id, to = %payment.to, amount = payment.amount, "Demo payment");
        Ok(tx_id)
    }
}
