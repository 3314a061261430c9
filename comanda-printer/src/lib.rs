//! # comanda-printer
//!
//! Receipt printing library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - Receipt document building (plain text + HTML variants)
//! - ASCII transliteration for printers without Latin accents
//! - Local print-bridge transport (WebSocket, discovery with bounded polling)
//! - Remote print-agent transport (one WebSocket connection per job)
//!
//! Business logic (WHAT to print) should stay in application code:
//! - Order receipt rendering → comanda-panel
//!
//! ## Example
//!
//! ```ignore
//! use comanda_printer::{AgentPrinter, PrinterBackend, ReceiptBuilder, ReceiptJob};
//!
//! // Build receipt content
//! let mut builder = ReceiptBuilder::new();
//! builder.title("Pedido #42");
//! builder.field("Cliente", "Maria");
//! builder.line("1x Pizza Margherita");
//! let job = ReceiptJob::new("42", builder.to_html(), builder.to_text());
//!
//! // Send to the remote agent
//! let printer = AgentPrinter::new("ws://127.0.0.1:12345");
//! printer.print(&job).await?;
//! ```

mod agent;
mod backend;
mod bridge;
mod error;
mod receipt;
mod transliterate;

// Re-exports
pub use agent::AgentPrinter;
pub use backend::{PrinterBackend, ReceiptJob};
pub use bridge::BridgePrinter;
pub use error::{PrintError, PrintResult};
pub use receipt::ReceiptBuilder;
pub use transliterate::to_ascii;
