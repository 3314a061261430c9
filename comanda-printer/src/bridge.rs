//! Local print-bridge backend
//!
//! Talks to a desktop print-service bridge (QZ-Tray style) over a local
//! WebSocket. The bridge process may start after us, so discovery polls at a
//! fixed short interval up to a bounded attempt count; once a transport is
//! attached it is reused for the rest of the process lifetime. An exhausted
//! budget fails the current job only - the next job polls again.

use crate::backend::{PrinterBackend, ReceiptJob};
use crate::error::{PrintError, PrintResult};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, trace, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Default poll interval between discovery attempts
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Default attempt budget (~5s total)
const DEFAULT_POLL_ATTEMPTS: u32 = 50;
/// Default wait for the bridge's print acknowledgement
const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(5);

/// Local print-bridge printer
pub struct BridgePrinter {
    url: String,
    printer_name: String,
    poll_interval: Duration,
    poll_attempts: u32,
    ack_timeout: Duration,
    transport: Mutex<Option<WsStream>>,
}

impl BridgePrinter {
    /// Create a bridge printer
    ///
    /// `printer_name` is the named printer config the bridge resolves
    /// (e.g. "POS-80").
    pub fn new(url: impl Into<String>, printer_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            printer_name: printer_name.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
            ack_timeout: DEFAULT_ACK_TIMEOUT,
            transport: Mutex::new(None),
        }
    }

    /// Override the discovery budget
    pub fn with_poll(mut self, interval: Duration, attempts: u32) -> Self {
        self.poll_interval = interval;
        self.poll_attempts = attempts;
        self
    }

    /// Override the acknowledgement timeout
    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = timeout;
        self
    }

    /// One connection attempt, bounded by the poll interval
    async fn try_connect(&self) -> Option<WsStream> {
        match tokio::time::timeout(self.poll_interval, connect_async(&self.url)).await {
            Ok(Ok((ws, _))) => Some(ws),
            Ok(Err(e)) => {
                trace!(error = %e, "bridge not reachable yet");
                // connect failed fast; pace the next attempt
                tokio::time::sleep(self.poll_interval).await;
                None
            }
            Err(_) => None,
        }
    }
}

#[async_trait]
impl PrinterBackend for BridgePrinter {
    fn name(&self) -> &'static str {
        "bridge"
    }

    async fn discover(&self) -> PrintResult<()> {
        let mut guard = self.transport.lock().await;
        if guard.is_some() {
            // Never open a duplicate connection
            return Ok(());
        }

        for attempt in 1..=self.poll_attempts {
            if let Some(ws) = self.try_connect().await {
                info!(url = %self.url, attempt, "Connected to print bridge");
                *guard = Some(ws);
                return Ok(());
            }
        }

        Err(PrintError::Unavailable(format!(
            "print bridge at {} did not come up after {} attempts",
            self.url, self.poll_attempts
        )))
    }

    async fn is_ready(&self) -> bool {
        self.transport.lock().await.is_some()
    }

    async fn print(&self, job: &ReceiptJob) -> PrintResult<()> {
        let mut guard = self.transport.lock().await;
        let ws = guard
            .as_mut()
            .ok_or_else(|| PrintError::Unavailable("no active bridge transport".into()))?;

        let envelope = json!({
            "call": "print",
            "config": { "printer": self.printer_name },
            "data": [
                { "type": "html", "format": "plain", "data": job.html }
            ],
        });

        if let Err(e) = ws.send(Message::Text(envelope.to_string().into())).await {
            // Dead transport; restart discovery on the next job
            *guard = None;
            return Err(PrintError::Connection(format!("bridge write failed: {e}")));
        }

        // The bridge answers every print call with one result message
        match tokio::time::timeout(self.ack_timeout, ws.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => {
                if text.contains("\"error\"") {
                    return Err(PrintError::Protocol(format!("bridge rejected job: {text}")));
                }
                debug!(number = %job.number, "Bridge accepted print job");
                Ok(())
            }
            Ok(Some(Ok(other))) => {
                warn!(frame = ?other, "Unexpected bridge frame after print");
                Ok(())
            }
            Ok(Some(Err(e))) => {
                *guard = None;
                Err(PrintError::Connection(format!("bridge read failed: {e}")))
            }
            Ok(None) => {
                *guard = None;
                Err(PrintError::Connection("bridge closed the connection".into()))
            }
            Err(_) => Err(PrintError::Timeout(format!(
                "no bridge acknowledgement within {:?}",
                self.ack_timeout
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;

    /// Minimal bridge stand-in: accepts, echoes an ok result per print call
    async fn spawn_fake_bridge(accepts: Arc<AtomicUsize>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                accepts.fetch_add(1, Ordering::SeqCst);
                let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                while let Some(Ok(msg)) = ws.next().await {
                    if let Message::Text(_) = msg {
                        ws.send(Message::Text("{\"result\":\"ok\"}".into()))
                            .await
                            .unwrap();
                    }
                }
            }
        });
        format!("ws://{addr}")
    }

    #[tokio::test]
    async fn test_discovery_budget_exhausted() {
        // Nothing listens on this port; every attempt must fail fast
        let printer = BridgePrinter::new("ws://127.0.0.1:9", "POS-80")
            .with_poll(Duration::from_millis(10), 3);

        let result = printer.discover().await;
        assert!(matches!(result, Err(PrintError::Unavailable(_))));
        assert!(!printer.is_ready().await);
    }

    #[tokio::test]
    async fn test_print_without_transport_fails() {
        let printer = BridgePrinter::new("ws://127.0.0.1:9", "POS-80");
        let job = ReceiptJob::new("1", "<p>x</p>".into(), "x\n".into());
        assert!(printer.print(&job).await.is_err());
    }

    #[tokio::test]
    async fn test_connect_print_and_reuse() {
        let accepts = Arc::new(AtomicUsize::new(0));
        let url = spawn_fake_bridge(Arc::clone(&accepts)).await;

        let printer = BridgePrinter::new(url, "POS-80").with_poll(Duration::from_millis(50), 10);

        printer.discover().await.unwrap();
        assert!(printer.is_ready().await);

        let job = ReceiptJob::new("A1", "<h2>Pedido #A1</h2>".into(), "Pedido #A1\n".into());
        printer.print(&job).await.unwrap();

        // Second discovery must reuse the attached transport
        printer.discover().await.unwrap();
        printer.print(&job).await.unwrap();
        assert_eq!(accepts.load(Ordering::SeqCst), 1);
    }
}
