//! Print dispatcher
//!
//! Hands rendered receipts to the configured backend. Dispatch never
//! returns an error: printer trouble is logged and the order stays on the
//! panel, undispatched, until the operator asks for a manual reprint.

use crate::model::Order;
use crate::printing::renderer::ReceiptRenderer;
use comanda_printer::{PrintResult, PrinterBackend, ReceiptJob};
use std::sync::Arc;
use tracing::{info, warn};

pub struct PrintDispatcher {
    backend: Arc<dyn PrinterBackend>,
    renderer: ReceiptRenderer,
}

impl PrintDispatcher {
    pub fn new(backend: Arc<dyn PrinterBackend>) -> Self {
        Self {
            backend,
            renderer: ReceiptRenderer::new(),
        }
    }

    /// Render and print one order; failures are logged, never propagated
    pub async fn dispatch(&self, order: &Order) {
        let job = self.renderer.render(order);
        match self.try_dispatch(&job).await {
            Ok(()) => {
                info!(
                    order_id = order.id,
                    number = %job.number,
                    backend = self.backend.name(),
                    "Receipt dispatched"
                );
            }
            Err(e) => {
                warn!(
                    order_id = order.id,
                    number = %job.number,
                    backend = self.backend.name(),
                    error = %e,
                    "Receipt dispatch failed; order stays on the panel"
                );
            }
        }
    }

    async fn try_dispatch(&self, job: &ReceiptJob) -> PrintResult<()> {
        self.backend.discover().await?;
        self.backend.print(job).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use comanda_printer::PrintError;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    pub(crate) struct MockBackend {
        pub fail_discovery: AtomicBool,
        pub jobs: Mutex<Vec<ReceiptJob>>,
    }

    impl MockBackend {
        pub(crate) fn new() -> Arc<Self> {
            Arc::new(Self {
                fail_discovery: AtomicBool::new(false),
                jobs: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PrinterBackend for MockBackend {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn discover(&self) -> PrintResult<()> {
            if self.fail_discovery.load(Ordering::SeqCst) {
                Err(PrintError::Unavailable("mock bridge never appeared".into()))
            } else {
                Ok(())
            }
        }

        async fn is_ready(&self) -> bool {
            !self.fail_discovery.load(Ordering::SeqCst)
        }

        async fn print(&self, job: &ReceiptJob) -> PrintResult<()> {
            self.jobs.lock().unwrap().push(job.clone());
            Ok(())
        }
    }

    fn order() -> Order {
        serde_json::from_value(serde_json::json!({
            "id": 5,
            "numero": "C3",
            "created_at": "2025-06-01T10:00:00Z"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_prints_rendered_job() {
        let backend = MockBackend::new();
        let dispatcher = PrintDispatcher::new(Arc::clone(&backend) as Arc<dyn PrinterBackend>);

        dispatcher.dispatch(&order()).await;

        let jobs = backend.jobs.lock().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].number, "C3");
    }

    #[tokio::test]
    async fn test_exhausted_discovery_does_not_propagate() {
        let backend = MockBackend::new();
        backend.fail_discovery.store(true, Ordering::SeqCst);
        let dispatcher = PrintDispatcher::new(Arc::clone(&backend) as Arc<dyn PrinterBackend>);

        // Must simply return; nothing printed, nothing panicked
        dispatcher.dispatch(&order()).await;
        assert!(backend.jobs.lock().unwrap().is_empty());
    }
}
