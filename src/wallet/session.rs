//! Wallet session
//!
//! Tracks the connected address and which provider produced it. The session
//! is an explicit object handed to whatever needs it:
//!
//! ```text
//! init (restore persisted session) → connect → ... → disconnect (teardown)
//!                                         ↑
//!              provider disconnect event ─┘ clears it too
//! ```
//!
//! Subscribers get a [`SessionEvent`] on every change so views can re-render.

use crate::store::{RecordStore, StoreError};
use crate::wallet::provider::{ProviderError, ProviderKind, WalletProvider};
use serde::Serialize;
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// A connected wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletHandle {
    pub address: String,
    pub kind: ProviderKind,
}

/// Session change notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected(WalletHandle),
    Disconnected { address: String, reason: String },
}

/// Errors that can occur while connecting or disconnecting
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Wallet provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// State shared with the disconnect watcher
struct SessionState {
    store: RecordStore,
    current: RwLock<Option<WalletHandle>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionState {
    fn get(&self) -> Option<WalletHandle> {
        self.current.read().ok().and_then(|guard| guard.clone())
    }

    fn set(&self, handle: Option<WalletHandle>) {
        match self.current.write() {
            Ok(mut guard) => *guard = handle,
            Err(poisoned) => *poisoned.into_inner() = handle,
        }
    }

    /// Clear the session. No-op when nothing is connected.
    fn end(&self, reason: &str) -> Result<(), StoreError> {
        let Some(previous) = self.get() else {
            return Ok(());
        };

        self.set(None);
        let cleared = self.store.clear_session();

        tracing::info!(address = %previous.address, reason, "Wallet disconnected");
        // No subscribers is fine
        let _ = self.events.send(SessionEvent::Disconnected {
            address: previous.address,
            reason: reason.to_string(),
        });

        cleared
    }
}

/// The current wallet session
pub struct WalletSession {
    state: Arc<SessionState>,
    provider: Arc<dyn WalletProvider>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl WalletSession {
    /// Create a session, restoring the persisted one if it was produced by
    /// the same kind of provider.
    ///
    /// Nothing here is awaited. The function is async because a restored
    /// session spawns its disconnect watcher with `tokio::spawn`, which
    /// panics outside a Tokio runtime; being async keeps callers on one.
    pub async fn init(store: RecordStore, provider: Arc<dyn WalletProvider>) -> Self {
        let (events, _) = broadcast::channel(32);

        let restored = store.load_session().and_then(|stored| {
            match stored.provider.parse::<ProviderKind>() {
                Ok(kind) if kind == provider.kind() => Some(WalletHandle {
                    address: stored.wallet,
                    kind,
                }),
                _ => {
                    tracing::info!(
                        stored = %stored.provider,
                        configured = %provider.kind(),
                        "Ignoring session from a different provider"
                    );
                    None
                }
            }
        });

        if let Some(handle) = &restored {
            tracing::debug!(address = %handle.address, kind = %handle.kind, "Restored wallet session");
        }

        let session = Self {
            state: Arc::new(SessionState {
                store,
                current: RwLock::new(restored.clone()),
                events,
            }),
            provider,
            watcher: Mutex::new(None),
        };

        if restored.is_some() {
            session.watch_disconnects();
        }

        session
    }

    /// Connect through the configured provider and persist the result
    pub async fn connect(&self) -> Result<WalletHandle, SessionError> {
        let address = self.provider.connect().await?;
        let handle = WalletHandle {
            address,
            kind: self.provider.kind(),
        };

        self.state
            .store
            .save_session(&handle.address, handle.kind.as_str())?;
        self.state.set(Some(handle.clone()));
        let _ = self.state.events.send(SessionEvent::Connected(handle.clone()));
        self.watch_disconnects();

        tracing::info!(address = %handle.address, kind = %handle.kind, "Wallet connected");
        Ok(handle)
    }

    /// Connected address, if any
    pub fn connected(&self) -> Option<String> {
        self.state.get().map(|handle| handle.address)
    }

    pub fn handle(&self) -> Option<WalletHandle> {
        self.state.get()
    }

    pub fn provider(&self) -> &Arc<dyn WalletProvider> {
        &self.provider
    }

    pub fn kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    /// Session change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.state.events.subscribe()
    }

    /// Tear the session down. The local session is cleared even when the
    /// provider fails to end its side.
    pub async fn disconnect(&self) -> Result<(), SessionError> {
        if let Err(e) = self.provider.disconnect().await {
            tracing::warn!("Wallet provider failed to disconnect: {}", e);
        }

        self.stop_watcher();
        self.state.end("disconnected by user")?;
        Ok(())
    }

    /// Follow provider-driven disconnects in the background
    fn watch_disconnects(&self) {
        let Some(mut rx) = self.provider.disconnect_events() else {
            return;
        };

        let state = Arc::clone(&self.state);
        let task = tokio::spawn(async move {
            loop {
                let reason = match rx.recv().await {
                    Ok(event) => event.reason,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Missed wallet events");
                        "wallet events lagged".to_string()
                    }
                    Err(RecvError::Closed) => break,
                };

                if let Err(e) = state.end(&reason) {
                    tracing::error!("Failed to clear persisted session: {}", e);
                }
            }
        });

        if let Ok(mut watcher) = self.watcher.lock() {
            if let Some(previous) = watcher.replace(task) {
                previous.abort();
            }
        }
    }

    fn stop_watcher(&self) {
        if let Ok(mut watcher) = self.watcher.lock() {
            if let Some(task) = watcher.take() {
                task.abort();
            }
        }
    }
}

impl Drop for WalletSession {
    fn drop(&mut self) {
        self.stop_watcher();
    }
}
