//! Panel error types
//!
//! Only feed-level failures surface to the operator (as a status banner).
//! Printing and alerting failures are logged where they happen and never
//! propagate into order-list mutation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PanelError {
    /// Feed transport failed (bulk fetch or link check)
    #[error("feed transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Push subscription socket failed
    #[error("feed socket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Feed rejected the request
    #[error("feed rejected request: {status} {detail}")]
    Feed { status: u16, detail: String },

    /// Payload could not be decoded into an order
    #[error("malformed order payload: {0}")]
    MalformedOrder(#[from] serde_json::Error),
}

/// Result type for panel operations
pub type PanelResult<T> = Result<T, PanelError>;
