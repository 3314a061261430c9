//! Error types for the printer library

use thiserror::Error;

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// Backend transport never became available within the discovery budget
    #[error("Printer unavailable: {0}")]
    Unavailable(String),

    /// Network connection error
    #[error("Connection failed: {0}")]
    Connection(String),

    /// IO error during printing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Timeout waiting for printer
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid printer configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Unexpected message from the bridge or agent
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
