//! Printer backend abstraction
//!
//! Exactly one backend is active per deployment, selected by configuration.
//! Backends are injected capabilities: callers never poll ambient globals,
//! they ask the backend to discover its transport and hand it a job.

use crate::error::PrintResult;
use async_trait::async_trait;

/// A rendered receipt ready for a backend
///
/// Carries both body shapes; each backend picks the one its transport
/// consumes (HTML for the bridge, ASCII text for the agent).
#[derive(Debug, Clone)]
pub struct ReceiptJob {
    /// Human-facing order number (falls back to the store id upstream)
    pub number: String,
    /// HTML body for the local bridge
    pub html: String,
    /// Plain ASCII body for the remote agent
    pub text: String,
}

impl ReceiptJob {
    pub fn new(number: impl Into<String>, html: String, text: String) -> Self {
        Self {
            number: number.into(),
            html,
            text,
        }
    }
}

/// Trait for printing backends
///
/// `discover` is the only bounded-wait operation in the pipeline: it must
/// return within its attempt budget, never hang. A `print` failure is the
/// caller's to log; it must never abort anything beyond the current job.
#[async_trait]
pub trait PrinterBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Establish (or confirm) the transport, within a bounded budget
    ///
    /// An exhausted budget abandons the current job only; the next call
    /// restarts discovery from scratch.
    async fn discover(&self) -> PrintResult<()>;

    /// Whether a transport is currently attached
    async fn is_ready(&self) -> bool;

    /// Send one receipt job
    async fn print(&self, job: &ReceiptJob) -> PrintResult<()>;
}
