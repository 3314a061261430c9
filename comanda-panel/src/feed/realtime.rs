//! Realtime feed over the hosted data platform
//!
//! Bulk fetch and link checks go over the platform's REST surface; the push
//! subscription is a Phoenix-style channel socket (join the table topic,
//! heartbeat every 30s, receive one message per inserted row). The
//! subscription task reconnects with exponential backoff and stops the
//! moment its cancellation token fires.

use crate::core::{Config, PanelError, PanelResult};
use crate::feed::{OrderFeed, OrderStream};
use crate::model::{OperatorId, Order};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Heartbeat interval expected by the channel socket
const HEARTBEAT_SECS: u64 = 30;
/// Initial reconnect delay
const INITIAL_RECONNECT_DELAY_SECS: u64 = 5;
/// Max reconnect delay
const MAX_RECONNECT_DELAY_SECS: u64 = 120;
/// Push buffer towards the intake worker
const PUSH_BUFFER: usize = 64;

/// Orders table and operator-link table names on the platform
const ORDERS_TABLE: &str = "pedidos";
const LINK_TABLE: &str = "operador_pedidos";

#[derive(Clone)]
pub struct RealtimeFeed {
    http: reqwest::Client,
    base_url: String,
    realtime_url: String,
    api_key: String,
}

impl RealtimeFeed {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.feed_url.trim_end_matches('/').to_string(),
            realtime_url: config.feed_realtime_url.clone(),
            api_key: config.feed_api_key.clone(),
        }
    }

    /// Secondary existence check of the operator link for one order
    ///
    /// A created-order event for another operator must be silently ignored,
    /// so every pushed row is confirmed here before it reaches the worker.
    async fn confirm_link(&self, operator: &OperatorId, order_id: i64) -> PanelResult<bool> {
        let url = format!("{}/rest/v1/{}", self.base_url, LINK_TABLE);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("select", "pedido_id".to_string()),
                ("operador_id", format!("eq.{operator}")),
                ("pedido_id", format!("eq.{order_id}")),
                ("limit", "1".to_string()),
            ])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(PanelError::Feed {
                status: resp.status().as_u16(),
                detail: resp.text().await.unwrap_or_default(),
            });
        }

        let rows: Vec<serde_json::Value> = resp.json().await?;
        Ok(!rows.is_empty())
    }
}

#[async_trait]
impl OrderFeed for RealtimeFeed {
    async fn load_initial(
        &self,
        operator: &OperatorId,
        window: Duration,
    ) -> PanelResult<Vec<Order>> {
        let since = chrono::Utc::now()
            - chrono::Duration::seconds(window.as_secs().min(i64::MAX as u64) as i64);
        let url = format!("{}/rest/v1/{}", self.base_url, ORDERS_TABLE);

        let resp = self
            .http
            .get(&url)
            .query(&[
                (
                    "select".to_string(),
                    format!("*,{LINK_TABLE}!inner(operador_id)"),
                ),
                (format!("{LINK_TABLE}.operador_id"), format!("eq.{operator}")),
                ("created_at".to_string(), format!("gte.{}", since.to_rfc3339())),
                ("order".to_string(), "id.desc".to_string()),
            ])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(PanelError::Feed {
                status: resp.status().as_u16(),
                detail: resp.text().await.unwrap_or_default(),
            });
        }

        let orders: Vec<Order> = resp.json().await?;
        debug!(operator = %operator, count = orders.len(), "Loaded initial order window");
        Ok(orders)
    }

    async fn subscribe(&self, operator: &OperatorId) -> PanelResult<OrderStream> {
        let (tx, rx) = mpsc::channel(PUSH_BUFFER);
        let cancel = CancellationToken::new();

        let task = SubscriptionTask {
            feed: self.clone(),
            operator: operator.clone(),
            tx,
            cancel: cancel.clone(),
        };
        tokio::spawn(task.run());

        Ok(OrderStream::new(rx, cancel))
    }
}

/// Why a socket session ended
enum SessionEnd {
    Cancelled,
    Disconnected,
}

struct SubscriptionTask {
    feed: RealtimeFeed,
    operator: OperatorId,
    tx: mpsc::Sender<Order>,
    cancel: CancellationToken,
}

impl SubscriptionTask {
    /// Reconnect loop with exponential backoff
    async fn run(self) {
        info!(operator = %self.operator, "Order subscription started");
        let mut delay = Duration::from_secs(INITIAL_RECONNECT_DELAY_SECS);

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            match self.session().await {
                Ok(SessionEnd::Cancelled) => break,
                Ok(SessionEnd::Disconnected) => {
                    warn!(delay_secs = delay.as_secs(), "Feed socket disconnected, will retry");
                }
                Err(e) => {
                    warn!(delay_secs = delay.as_secs(), "Feed socket failed, will retry: {e}");
                }
            }

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
            delay = (delay * 2).min(Duration::from_secs(MAX_RECONNECT_DELAY_SECS));
        }

        info!(operator = %self.operator, "Order subscription stopped");
    }

    /// One socket session: join, heartbeat, forward inserted rows
    async fn session(&self) -> PanelResult<SessionEnd> {
        let url = format!(
            "{}?apikey={}&vsn=1.0.0",
            self.feed.realtime_url, self.feed.api_key
        );
        let (mut ws, _) = connect_async(&url).await?;

        let join = json!({
            "topic": format!("realtime:public:{ORDERS_TABLE}"),
            "event": "phx_join",
            "payload": {
                "config": {
                    "postgres_changes": [
                        { "event": "INSERT", "schema": "public", "table": ORDERS_TABLE }
                    ]
                }
            },
            "ref": "1",
        });
        ws.send(Message::Text(join.to_string().into())).await?;

        let mut heartbeat = tokio::time::interval(Duration::from_secs(HEARTBEAT_SECS));
        heartbeat.tick().await; // skip immediate tick
        let mut heartbeat_ref: u64 = 1;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    let _ = ws.close(None).await;
                    return Ok(SessionEnd::Cancelled);
                }

                _ = heartbeat.tick() => {
                    heartbeat_ref += 1;
                    let beat = json!({
                        "topic": "phoenix",
                        "event": "heartbeat",
                        "payload": {},
                        "ref": heartbeat_ref.to_string(),
                    });
                    if ws.send(Message::Text(beat.to_string().into())).await.is_err() {
                        return Ok(SessionEnd::Disconnected);
                    }
                }

                msg = ws.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if self.handle_text(&text).await.is_err() {
                                // Worker side gone; stop feeding
                                return Ok(SessionEnd::Cancelled);
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            let _ = ws.send(Message::Pong(data)).await;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            return Ok(SessionEnd::Disconnected);
                        }
                        Some(Err(e)) => {
                            warn!("Feed socket error: {e}");
                            return Ok(SessionEnd::Disconnected);
                        }
                        _ => {} // Binary, Pong - ignore
                    }
                }
            }
        }
    }

    /// Decode one socket frame; forward the order if it belongs to us
    ///
    /// Returns Err only when the receiving side is gone.
    async fn handle_text(&self, text: &str) -> Result<(), ()> {
        let Some(order) = parse_insert(text) else {
            trace!("Ignoring non-insert feed frame");
            return Ok(());
        };

        match self.feed.confirm_link(&self.operator, order.id).await {
            Ok(true) => {
                debug!(order_id = order.id, "Order link confirmed, forwarding");
                self.tx.send(order).await.map_err(|_| ())
            }
            Ok(false) => {
                trace!(order_id = order.id, "Order belongs to another operator, ignoring");
                Ok(())
            }
            Err(e) => {
                // Cannot prove the link; safer to drop than to show a
                // foreign order
                warn!(order_id = order.id, "Link check failed, dropping event: {e}");
                Ok(())
            }
        }
    }
}

/// Extract an inserted order row from a channel frame, if it is one
///
/// Tolerates the two envelope shapes the platform has shipped: the record
/// directly under `payload`, or nested under `payload.data`.
pub(crate) fn parse_insert(text: &str) -> Option<Order> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let payload = value.get("payload")?;

    let (kind, record) = if let Some(data) = payload.get("data") {
        (data.get("type"), data.get("record"))
    } else {
        (payload.get("type"), payload.get("record"))
    };

    if kind.and_then(|k| k.as_str()) != Some("INSERT") {
        return None;
    }

    match serde_json::from_value::<Order>(record?.clone()) {
        Ok(order) => Some(order),
        Err(e) => {
            warn!("Malformed order in feed frame: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_insert_nested_envelope() {
        let frame = json!({
            "topic": "realtime:public:pedidos",
            "event": "postgres_changes",
            "payload": {
                "data": {
                    "type": "INSERT",
                    "record": {
                        "id": 3,
                        "numero": "B2",
                        "cliente": "Ana",
                        "created_at": "2025-06-01T12:00:00Z"
                    }
                }
            }
        });
        let order = parse_insert(&frame.to_string()).unwrap();
        assert_eq!(order.id, 3);
        assert_eq!(order.number.as_deref(), Some("B2"));
    }

    #[test]
    fn test_parse_insert_flat_envelope() {
        let frame = json!({
            "event": "INSERT",
            "payload": {
                "type": "INSERT",
                "record": { "id": 4, "created_at": "2025-06-01T12:00:00Z" }
            }
        });
        assert!(parse_insert(&frame.to_string()).is_some());
    }

    #[test]
    fn test_parse_ignores_other_events() {
        let frame = json!({
            "event": "phx_reply",
            "payload": { "status": "ok" }
        });
        assert!(parse_insert(&frame.to_string()).is_none());

        let update = json!({
            "payload": {
                "data": {
                    "type": "UPDATE",
                    "record": { "id": 5, "created_at": "2025-06-01T12:00:00Z" }
                }
            }
        });
        assert!(parse_insert(&update.to_string()).is_none());
    }

    #[test]
    fn test_parse_ignores_malformed_record() {
        let frame = json!({
            "payload": {
                "data": { "type": "INSERT", "record": { "numero": "no id" } }
            }
        });
        assert!(parse_insert(&frame.to_string()).is_none());
    }
}
