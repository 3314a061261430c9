//! Inbound order feed
//!
//! The panel never talks to the data platform directly; it goes through the
//! [`OrderFeed`] seam so the intake worker can be driven by the real
//! realtime feed in production and by a channel-backed fake in tests.

mod realtime;

pub use realtime::RealtimeFeed;

use crate::core::PanelResult;
use crate::model::{OperatorId, Order};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Source of inbound orders for one operator
#[async_trait]
pub trait OrderFeed: Send + Sync {
    /// Fetch the orders created within `window` that are linked to the
    /// operator, newest-first by id
    async fn load_initial(
        &self,
        operator: &OperatorId,
        window: Duration,
    ) -> PanelResult<Vec<Order>>;

    /// Open a long-lived push subscription scoped to the operator
    ///
    /// Only orders whose operator link is confirmed flow through the
    /// returned stream; events for other operators are silently dropped at
    /// the feed layer.
    async fn subscribe(&self, operator: &OperatorId) -> PanelResult<OrderStream>;
}

/// Cancellable stream of pushed orders
///
/// Dropping the stream cancels the underlying subscription task, so a torn
/// down panel can never keep receiving events.
pub struct OrderStream {
    rx: mpsc::Receiver<Order>,
    cancel: CancellationToken,
}

impl OrderStream {
    pub fn new(rx: mpsc::Receiver<Order>, cancel: CancellationToken) -> Self {
        Self { rx, cancel }
    }

    /// Next pushed order; `None` when the subscription has ended
    pub async fn next(&mut self) -> Option<Order> {
        self.rx.recv().await
    }

    /// Tear down the subscription
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for OrderStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
