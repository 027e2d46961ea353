//! Sending tips
//!
//! [`TipSender`] validates a tip, hands the payment to the session's wallet
//! provider and appends the confirmed tip to the store. The store is only
//! touched after the provider returns a transaction id.
//!
//! One send runs at a time per sender. A second call made while the first is
//! waiting on the wallet fails with [`TipError::Busy`] instead of submitting a
//! duplicate payment.

use crate::config::AppConfig;
use crate::store::{algo_to_micro, RecordStore, StoreError, TipRecord};
use crate::wallet::{PaymentRequest, ProviderError, WalletSession};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Errors that can occur when sending a tip
#[derive(Error, Debug)]
pub enum TipError {
    #[error("Please connect your wallet first")]
    NotConnected,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("A tip is already being sent")]
    Busy,

    #[error("Wallet provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The payment went through but the tip could not be recorded
    #[error("Tip sent (transaction {tx_id}) but could not be saved: {source}")]
    Store {
        tx_id: String,
        #[source]
        source: StoreError,
    },
}

impl TipError {
    /// Errors the user can fix themselves
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            TipError::NotConnected | TipError::InvalidAmount(_) | TipError::Busy
        )
    }
}

/// Accepted tip range, in ALGO. Unset bounds accept any positive amount.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TipLimits {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl TipLimits {
    /// Validate an ALGO amount and convert it to micro-units
    pub fn check(&self, amount: f64) -> Result<u64, TipError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(TipError::InvalidAmount(
                "Please enter a valid amount".to_string(),
            ));
        }
        if let Some(min) = self.min.filter(|min| amount < *min) {
            return Err(TipError::InvalidAmount(format!("Minimum tip is {} ALGO", min)));
        }
        if let Some(max) = self.max.filter(|max| amount > *max) {
            return Err(TipError::InvalidAmount(format!("Maximum tip is {} ALGO", max)));
        }

        match algo_to_micro(amount) {
            Some(micro) if micro > 0 => Ok(micro),
            _ => Err(TipError::InvalidAmount(format!("{} ALGO is too small", amount))),
        }
    }
}

/// Releases the in-flight flag on every exit path
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Sends tips through the session's wallet provider
pub struct TipSender {
    store: RecordStore,
    limits: TipLimits,
    note: String,
    in_flight: AtomicBool,
}

impl TipSender {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            limits: TipLimits::default(),
            note: "Tip from Creator Tip Jar".to_string(),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Sender using the limits and note from the app config
    pub fn from_config(store: RecordStore, app: &AppConfig) -> Self {
        Self::new(store)
            .limits(TipLimits {
                min: app.min_tip,
                max: app.max_tip,
            })
            .note(app.transaction_note.clone())
    }

    /// Builder: set accepted range
    pub fn limits(mut self, limits: TipLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Builder: set transaction note
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// True while a send is waiting on the wallet
    pub fn is_sending(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Send `amount` ALGO from the connected wallet to `to`
    pub async fn send(
        &self,
        session: &WalletSession,
        to: &str,
        amount: f64,
    ) -> Result<TipRecord, TipError> {
        let from = session.connected().ok_or(TipError::NotConnected)?;
        let micro = self.limits.check(amount)?;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(TipError::Busy);
        }
        let _guard = InFlight(&self.in_flight);

        let payment = PaymentRequest {
            from,
            to: to.to_string(),
            amount: micro,
            note: self.note.clone(),
        };

        tracing::info!(to = %payment.to, amount = payment.amount, provider = %session.kind(), "Sending tip");

        let tx_id = match session.provider().send_payment(&payment).await {
            Ok(tx_id) => tx_id,
            Err(e) => {
                tracing::error!(to = %payment.to, "Tip failed: {}", e);
                return Err(e.into());
            }
        };

        let record = TipRecord::new(payment.from, payment.to, payment.amount, tx_id);
        if let Err(source) = self.store.append_tip(record.clone()) {
            tracing::error!(tx_id = %record.tx_id, "Tip sent but not recorded: {}", source);
            return Err(TipError::Store {
                tx_id: record.tx_id,
                source,
            });
        }

        tracing::info!(tx_id = %record.tx_id, "Tip recorded");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{supporter_count, tips_received_by, total_received};
    use crate::store::KeyValueBackend;
    use crate::wallet::testing::FakeProvider;
    use crate::wallet::{DemoProvider, WalletProvider};
    use std::sync::Arc;
    use std::time::Duration;

    async fn demo_session(store: &RecordStore) -> WalletSession {
        let provider: Arc<dyn WalletProvider> = Arc::new(DemoProvider::new(store.clone()));
        WalletSession::init(store.clone(), provider).await
    }

    #[tokio::test]
    async fn test_demo_tip_scenario() {
        let store = RecordStore::in_memory();
        let session = demo_session(&store).await;
        session.connect().await.unwrap();

        let sender = TipSender::new(store.clone());
        let tip = sender.send(&session, "CREATORX", 5.0).await.unwrap();
        assert!(tip.tx_id.starts_with("TXN"));

        let tips = store.list_tips();
        let received = tips_received_by(&tips, "CREATORX");
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].amount, 5_000_000);
        assert_eq!(total_received(&tips, "CREATORX"), 5.0);
        assert_eq!(supporter_count(&tips, "CREATORX"), 1);
    }

    #[tokio::test]
    async fn test_not_connected_leaves_store_unchanged() {
        let store = RecordStore::in_memory();
        let session = demo_session(&store).await;

        let sender = TipSender::new(store.clone());
        let err = sender.send(&session, "CREATORX", 5.0).await.unwrap_err();
        assert!(matches!(err, TipError::NotConnected));
        assert!(store.list_tips().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_amounts() {
        let store = RecordStore::in_memory();
        let session = demo_session(&store).await;
        session.connect().await.unwrap();
        let sender = TipSender::new(store.clone());

        for amount in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-9] {
            let err = sender.send(&session, "C", amount).await.unwrap_err();
            assert!(matches!(err, TipError::InvalidAmount(_)), "amount {}", amount);
        }
        assert!(store.list_tips().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_leaves_store_unchanged() {
        let store = RecordStore::in_memory();
        let provider: Arc<dyn WalletProvider> = Arc::new(FakeProvider::new("WALLET"));
        let session = WalletSession::init(store.clone(), provider).await;
        session.connect().await.unwrap();

        // Swap in a failing provider over the same persisted session
        let failing: Arc<dyn WalletProvider> = Arc::new(FakeProvider::new("WALLET").failing());
        let session = WalletSession::init(store.clone(), failing).await;
        assert!(session.connected().is_some());

        let sender = TipSender::new(store.clone());
        let err = sender.send(&session, "C", 1.0).await.unwrap_err();
        assert!(matches!(err, TipError::Provider(_)));
        assert!(!err.is_user_error());
        assert!(store.list_tips().is_empty());
        assert!(!sender.is_sending());
    }

    #[tokio::test]
    async fn test_identical_sends_produce_two_records() {
        let store = RecordStore::in_memory();
        let session = demo_session(&store).await;
        session.connect().await.unwrap();
        let sender = TipSender::new(store.clone());

        sender.send(&session, "C", 1.0).await.unwrap();
        sender.send(&session, "C", 1.0).await.unwrap();
        assert_eq!(store.list_tips().len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_send_is_busy() {
        let store = RecordStore::in_memory();
        let fake = Arc::new(FakeProvider::new("WALLET").slow(Duration::from_millis(100)));
        let provider: Arc<dyn WalletProvider> = fake.clone();
        let session = WalletSession::init(store.clone(), provider).await;
        session.connect().await.unwrap();
        let sender = TipSender::new(store.clone());

        let (first, second) = tokio::join!(
            sender.send(&session, "C", 1.0),
            sender.send(&session, "C", 2.0)
        );

        assert!(first.is_ok());
        assert!(matches!(second, Err(TipError::Busy)));
        assert_eq!(fake.payments(), 1);
        assert_eq!(store.list_tips().len(), 1);

        // Flag released
        sender.send(&session, "C", 3.0).await.unwrap();
        assert_eq!(store.list_tips().len(), 2);
    }

    #[tokio::test]
    async fn test_limits_from_config() {
        let store = RecordStore::in_memory();
        let session = demo_session(&store).await;
        session.connect().await.unwrap();

        let app = AppConfig {
            min_tip: Some(1.0),
            max_tip: Some(2.0),
            transaction_note: "thanks".to_string(),
            ..AppConfig::default()
        };
        let sender = TipSender::from_config(store.clone(), &app);

        assert!(matches!(
            sender.send(&session, "C", 0.5).await,
            Err(TipError::InvalidAmount(_))
        ));
        let tip = sender.send(&session, "C", 1.5).await.unwrap();
        assert_eq!(tip.amount, 1_500_000);
    }

    #[tokio::test]
    async fn test_default_limits_accept_any_positive_amount() {
        let store = RecordStore::in_memory();
        let session = demo_session(&store).await;
        session.connect().await.unwrap();
        let sender = TipSender::new(store.clone());

        let small = sender.send(&session, "C", 0.05).await.unwrap();
        assert_eq!(small.amount, 50_000);
        let large = sender.send(&session, "C", 5000.0).await.unwrap();
        assert_eq!(large.amount, 5_000_000_000);
    }

    /// Accepts reads, refuses every write
    struct ReadOnlyBackend;

    impl KeyValueBackend for ReadOnlyBackend {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&self, _key: &str, _value: String) -> crate::store::StoreResult<()> {
            Err(StoreError::Backend("read-only".to_string()))
        }

        fn remove(&self, _key: &str) -> crate::store::StoreResult<()> {
            Err(StoreError::Backend("read-only".to_string()))
        }
    }

    #[tokio::test]
    async fn test_store_failure_after_payment_keeps_tx_id() {
        let session_store = RecordStore::in_memory();
        let session = demo_session(&session_store).await;
        session.connect().await.unwrap();

        let sender = TipSender::new(RecordStore::new(Arc::new(ReadOnlyBackend)));
        let err = sender.send(&session, "C", 1.0).await.unwrap_err();

        let TipError::Store { tx_id, .. } = &err else {
            panic!("expected store error, got {:?}", err);
        };
        assert!(tx_id.starts_with("TXN"));
        assert!(!err.is_user_error());
        assert!(!sender.is_sending());
    }
}
