//! Remote print-agent backend
//!
//! The agent is a small daemon next to the physical printer. It accepts one
//! JSON message per WebSocket connection:
//!
//! ```json
//! { "texto": "<ascii receipt body>", "numero": "<order number>" }
//! ```
//!
//! and emits at most one text acknowledgement before the client closes the
//! connection. A fresh connection is opened per job; there is no transport
//! to discover or keep alive.

use crate::backend::{PrinterBackend, ReceiptJob};
use crate::error::{PrintError, PrintResult};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::time::Duration;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

/// Default connect timeout per job
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
/// Default wait for the agent's acknowledgement
const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(2);

/// Remote print-agent printer
pub struct AgentPrinter {
    url: String,
    connect_timeout: Duration,
    ack_timeout: Duration,
}

impl AgentPrinter {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            ack_timeout: DEFAULT_ACK_TIMEOUT,
        }
    }

    /// Override the per-job timeouts
    pub fn with_timeouts(mut self, connect: Duration, ack: Duration) -> Self {
        self.connect_timeout = connect;
        self.ack_timeout = ack;
        self
    }
}

#[async_trait]
impl PrinterBackend for AgentPrinter {
    fn name(&self) -> &'static str {
        "agent"
    }

    async fn discover(&self) -> PrintResult<()> {
        // Per-job connections; nothing to attach ahead of time
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        true
    }

    async fn print(&self, job: &ReceiptJob) -> PrintResult<()> {
        let (mut ws, _) =
            tokio::time::timeout(self.connect_timeout, connect_async(&self.url))
                .await
                .map_err(|_| {
                    PrintError::Timeout(format!("agent connect timeout: {}", self.url))
                })?
                .map_err(|e| PrintError::Connection(format!("{}: {e}", self.url)))?;

        let payload = json!({
            "texto": job.text,
            "numero": job.number,
        });

        ws.send(Message::Text(payload.to_string().into()))
            .await
            .map_err(|e| PrintError::Connection(format!("agent write failed: {e}")))?;

        // At most one acknowledgement; silence is not an error
        match tokio::time::timeout(self.ack_timeout, ws.next()).await {
            Ok(Some(Ok(Message::Text(ack)))) => {
                debug!(number = %job.number, ack = %ack, "Agent acknowledged print job");
            }
            Ok(Some(Err(e))) => {
                let _ = ws.close(None).await;
                return Err(PrintError::Connection(format!("agent read failed: {e}")));
            }
            _ => {
                debug!(number = %job.number, "No agent acknowledgement, closing anyway");
            }
        }

        let _ = ws.close(None).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_print_sends_single_message_and_reads_ack() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<String>();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            if let Some(Ok(Message::Text(text))) = ws.next().await {
                ws.send(Message::Text("impresso".into())).await.unwrap();
                let _ = tx.send(text.to_string());
            }
        });

        let printer = AgentPrinter::new(format!("ws://{addr}"));
        let job = ReceiptJob::new("42", String::new(), "Pedido #42\nTotal: R$10.00\n".into());
        printer.print(&job).await.unwrap();

        let received = rx.await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&received).unwrap();
        assert_eq!(value["numero"], "42");
        assert!(value["texto"].as_str().unwrap().contains("Pedido #42"));
    }

    #[tokio::test]
    async fn test_connect_error_is_reported_not_retried() {
        let printer = AgentPrinter::new("ws://127.0.0.1:9")
            .with_timeouts(Duration::from_millis(200), Duration::from_millis(100));
        let job = ReceiptJob::new("1", String::new(), "x\n".into());

        let result = printer.print(&job).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_ack_is_not_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            // Swallow the job, never answer
            let _ = ws.next().await;
            // Hold the socket open past the client's ack window
            tokio::time::sleep(Duration::from_millis(500)).await;
        });

        let printer = AgentPrinter::new(format!("ws://{addr}"))
            .with_timeouts(Duration::from_secs(1), Duration::from_millis(50));
        let job = ReceiptJob::new("7", String::new(), "x\n".into());
        printer.print(&job).await.unwrap();
    }
}
