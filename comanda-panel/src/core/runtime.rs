//! Panel runtime assembly
//!
//! Wires configuration, feed, printing backend and the intake worker
//! together and hands back the channel endpoints the display layer talks
//! through. The worker owns all mutable state; the handle only carries
//! read sides and command senders.

use crate::core::config::{Config, PrinterBackendKind};
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::feed::OrderFeed;
use crate::model::{OperatorId, Order};
use crate::panel::alert::{AlertController, AlertSignal, BroadcastCue};
use crate::panel::status::StatusLine;
use crate::panel::store::OrderStore;
use crate::panel::window::IntakeWindow;
use crate::panel::worker::{PanelCommand, PanelWorker};
use crate::printing::PrintDispatcher;
use comanda_printer::{AgentPrinter, BridgePrinter, PrinterBackend};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::info;

/// Read sides and command senders of a running panel
pub struct PanelHandle {
    /// Current panel contents, newest-first
    pub orders: watch::Receiver<Arc<[Order]>>,
    /// Operator status line
    pub status: watch::Receiver<String>,
    /// Alert cue signals for whatever plays the audio asset
    pub alerts: broadcast::Receiver<AlertSignal>,
    /// Operator actions (sound toggle, reprint)
    pub commands: mpsc::Sender<PanelCommand>,
    /// Operator identity; send on login/logout to (re)subscribe
    pub operator: watch::Sender<Option<OperatorId>>,
}

/// Build the printing backend the configuration names
pub fn build_backend(config: &Config) -> Arc<dyn PrinterBackend> {
    match config.printer_backend {
        PrinterBackendKind::Bridge => Arc::new(
            BridgePrinter::new(&config.bridge_url, &config.bridge_printer_name)
                .with_poll(config.bridge_poll_interval(), config.bridge_poll_attempts),
        ),
        PrinterBackendKind::Agent => Arc::new(AgentPrinter::new(&config.agent_url)),
    }
}

/// Assemble the pipeline and start the intake worker
pub fn spawn_panel(
    config: &Config,
    feed: Arc<dyn OrderFeed>,
    tasks: &mut BackgroundTasks,
) -> PanelHandle {
    let backend = build_backend(config);
    info!(backend = backend.name(), "Printing backend configured");

    let (store, orders_rx) = OrderStore::new();
    let window = IntakeWindow::new(
        chrono::Duration::seconds(config.retention_window_secs as i64),
        chrono::Duration::seconds(config.dedup_margin_secs as i64),
        store,
    );

    let (status, status_rx) = StatusLine::new();
    let (cue, alerts_rx) = BroadcastCue::new();
    let alert = AlertController::new(config.sound_enabled, Arc::new(cue));
    let dispatcher = Arc::new(PrintDispatcher::new(backend));

    let (operator_tx, operator_rx) = watch::channel(config.operator_id.clone());
    let (command_tx, command_rx) = mpsc::channel(16);

    let worker = PanelWorker::new(
        feed,
        window,
        alert,
        status,
        dispatcher,
        config.sweep_interval(),
    );

    let shutdown = tasks.shutdown_token();
    tasks.spawn("panel_intake", TaskKind::Worker, async move {
        worker.run(operator_rx, command_rx, shutdown).await;
    });

    PanelHandle {
        orders: orders_rx,
        status: status_rx,
        alerts: alerts_rx,
        commands: command_tx,
        operator: operator_tx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_follows_configuration() {
        let mut config = Config::from_env();
        config.printer_backend = PrinterBackendKind::Bridge;
        assert_eq!(build_backend(&config).name(), "bridge");

        config.printer_backend = PrinterBackendKind::Agent;
        assert_eq!(build_backend(&config).name(), "agent");
    }
}
