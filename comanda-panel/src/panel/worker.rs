//! Panel intake worker
//!
//! The single loop that owns every piece of mutable panel state (order
//! store, dedup window, alert flag, status line). Feed events, sweep
//! ticks and operator commands are serialized here by construction, so no
//! mutation ever races another.
//!
//! ```text
//! OrderFeed ──► admit ──► { AlertController, PrintDispatcher } ──► OrderStore
//!                                                  (display layer reads watch snapshots)
//! ```

use crate::feed::{OrderFeed, OrderStream};
use crate::model::{OperatorId, Order};
use crate::panel::alert::AlertController;
use crate::panel::status::{STATUS_FEED_ERROR, StatusLine};
use crate::panel::window::{Admission, IntakeWindow};
use crate::printing::PrintDispatcher;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Operator actions relayed from the display layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelCommand {
    /// Flip the alert sound flag
    ToggleSound,
    /// Re-dispatch the receipt of a displayed order
    Reprint(i64),
}

pub struct PanelWorker {
    feed: Arc<dyn OrderFeed>,
    window: IntakeWindow,
    alert: AlertController,
    status: StatusLine,
    dispatcher: Arc<PrintDispatcher>,
    sweep_interval: Duration,
}

impl PanelWorker {
    pub fn new(
        feed: Arc<dyn OrderFeed>,
        window: IntakeWindow,
        alert: AlertController,
        status: StatusLine,
        dispatcher: Arc<PrintDispatcher>,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            feed,
            window,
            alert,
            status,
            dispatcher,
            sweep_interval,
        }
    }

    /// Run until shutdown (blocks the task, not the runtime)
    ///
    /// The operator identity may arrive after startup and may change on
    /// re-login; each change tears down the previous subscription and
    /// opens a fresh one.
    pub async fn run(
        mut self,
        mut operator_rx: watch::Receiver<Option<OperatorId>>,
        mut command_rx: mpsc::Receiver<PanelCommand>,
        shutdown: CancellationToken,
    ) {
        info!("Panel intake worker started");

        let mut sweep = tokio::time::interval(self.sweep_interval);
        sweep.tick().await; // skip immediate tick

        let mut stream: Option<OrderStream> = None;
        self.connect(&operator_rx, &mut stream).await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Panel intake worker received shutdown signal");
                    break;
                }

                changed = operator_rx.changed() => {
                    if changed.is_err() {
                        info!("Operator identity source closed, stopping");
                        break;
                    }
                    self.connect(&operator_rx, &mut stream).await;
                }

                Some(cmd) = command_rx.recv() => {
                    self.handle_command(cmd);
                }

                _ = sweep.tick() => {
                    let stats = self.window.sweep(Utc::now());
                    if stats.evicted > 0 {
                        debug!(evicted = stats.evicted, "Evicted aged-out orders");
                    }
                }

                order = Self::next_order(&mut stream) => {
                    match order {
                        Some(order) => self.handle_order(order),
                        None => {
                            warn!("Push subscription ended");
                            stream = None;
                            self.status.set(STATUS_FEED_ERROR);
                        }
                    }
                }
            }
        }

        // Teardown must release the subscription; a live one would keep
        // mutating state nobody reads
        if let Some(s) = stream.take() {
            s.cancel();
        }
        info!("Panel intake worker stopped");
    }

    /// Pending-forever when no subscription is attached
    async fn next_order(stream: &mut Option<OrderStream>) -> Option<Order> {
        match stream {
            Some(s) => s.next().await,
            None => std::future::pending().await,
        }
    }

    /// (Re)establish the feed for the current operator identity
    async fn connect(
        &mut self,
        operator_rx: &watch::Receiver<Option<OperatorId>>,
        stream: &mut Option<OrderStream>,
    ) {
        if let Some(old) = stream.take() {
            old.cancel();
        }
        // The panel shows one operator's orders only; whatever the
        // previous identity accumulated must not survive the switch
        self.window.reset();

        let operator = operator_rx.borrow().clone();
        let Some(operator) = operator else {
            debug!("Operator identity not available yet; subscription deferred");
            return;
        };

        let window = self
            .window
            .retention()
            .to_std()
            .unwrap_or(Duration::from_secs(3600));

        match self.feed.load_initial(&operator, window).await {
            Ok(orders) => {
                let now = Utc::now();
                // The feed returns newest-first; admit oldest-first so the
                // store ends up newest-first
                for order in orders.into_iter().rev() {
                    self.window.admit(order, now);
                }
                info!(
                    operator = %operator,
                    count = self.window.store().len(),
                    "Initial order window loaded"
                );
            }
            Err(e) => {
                error!(operator = %operator, error = %e, "Initial order fetch failed");
                self.status.set(STATUS_FEED_ERROR);
            }
        }

        match self.feed.subscribe(&operator).await {
            Ok(s) => {
                *stream = Some(s);
                info!(operator = %operator, "Subscribed to order feed");
            }
            Err(e) => {
                error!(operator = %operator, error = %e, "Subscription failed");
                self.status.set(STATUS_FEED_ERROR);
            }
        }
    }

    /// One pushed order event
    fn handle_order(&mut self, order: Order) {
        let order_id = order.id;
        match self.window.admit(order, Utc::now()) {
            Admission::Accepted => {
                self.alert.on_new_order(&mut self.status);
                if let Some(newest) = self.window.store().front().cloned() {
                    self.spawn_dispatch(newest);
                }
            }
            Admission::Duplicate => {
                trace!(order_id, "Duplicate event filtered");
            }
            Admission::Expired => {
                debug!(order_id, "Order older than the window; recorded, not displayed");
            }
        }
    }

    fn handle_command(&mut self, cmd: PanelCommand) {
        match cmd {
            PanelCommand::ToggleSound => {
                self.alert.toggle(&mut self.status);
            }
            PanelCommand::Reprint(order_id) => match self.window.store().find(order_id).cloned() {
                Some(order) => {
                    info!(order_id, "Manual reprint requested");
                    self.spawn_dispatch(order);
                }
                None => {
                    warn!(order_id, "Reprint requested for an order not on the panel");
                }
            },
        }
    }

    /// Printing must never block admission or the alert
    fn spawn_dispatch(&self, order: Order) {
        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move {
            dispatcher.dispatch(&order).await;
        });
    }
}
