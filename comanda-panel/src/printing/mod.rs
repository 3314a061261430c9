//! Receipt rendering and dispatch

mod dispatcher;
mod renderer;

pub use dispatcher::PrintDispatcher;
pub use renderer::ReceiptRenderer;
