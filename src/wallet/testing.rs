//! Scriptable provider and HTTP stub for tests

use crate::wallet::provider::{
    DisconnectEvent, PaymentRequest, ProviderError, ProviderKind, WalletProvider,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

pub struct FakeProvider {
    address: String,
    fail: bool,
    delay: Option<Duration>,
    events: broadcast::Sender<DisconnectEvent>,
    payments: AtomicUsize,
}

impl FakeProvider {
    pub fn new(address: &str) -> Self {
        let (events, _) = broadcast::channel(8);
        Self {
            address: address.to_string(),
            fail: false,
            delay: None,
            events,
            payments: AtomicUsize::new(0),
        }
    }

    /// Every call fails with `Rejected`
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Payments take this long
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn emit_disconnect(&self, reason: &str) {
        let _ = self.events.send(DisconnectEvent {
            reason: reason.to_string(),
        });
    }

    pub fn payments(&self) -> usize {
        self.payments.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletProvider for FakeProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::External
    }

    async fn connect(&self) -> Result<String, ProviderError> {
        if self.fail {
            return Err(ProviderError::Rejected("user declined".to_string()));
        }
        Ok(self.address.clone())
    }

    async fn send_payment(&self, _payment: &PaymentRequest) -> Result<String, ProviderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(ProviderError::Rejected("signature declined".to_string()));
        }
        let n = self.payments.fetch_add(1, Ordering::SeqCst);
        Ok(format!("FAKETX{}", n))
    }

    fn disconnect_events(&self) -> Option<broadcast::Receiver<DisconnectEvent>> {
        Some(self.events.subscribe())
    }
}

type Route = dyn Fn(&str, &str) -> (u16, String) + Send + Sync;

/// Minimal HTTP/1.1 server on a random local port. Every request is answered
/// by `route(method, path)` with a JSON body, one request per connection.
pub struct StubServer {
    pub url: String,
    task: JoinHandle<()>,
}

impl StubServer {
    pub async fn start<F>(route: F) -> Self
    where
        F: Fn(&str, &str) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let route: Arc<Route> = Arc::new(route);

        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let route = Arc::clone(&route);
                tokio::spawn(async move {
                    let _ = serve(stream, route.as_ref()).await;
                });
            }
        });

        Self { url, task }
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(mut stream: TcpStream, route: &Route) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    // Drain the body so the client sees a clean response
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let mut request_line = head.split_whitespace();
    let method = request_line.next().unwrap_or_default();
    let path = request_line.next().unwrap_or_default();
    let (status, body) = route(method, path);

    let response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

/// algod `/v2/transactions/params` body
pub const PARAMS_JSON: &str = r#"{"consensus-version":"future","fee":0,"genesis-hash":"SGO1GKSzyE7IEPItTxCByw9x8FmnrCDexi9/cOUJOiI=","genesis-id":"testnet-v1.0","last-round":100,"min-fee":1000}"#;
