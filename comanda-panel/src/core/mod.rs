//! Configuration, errors, tasks and runtime assembly

pub mod config;
pub mod error;
pub mod runtime;
pub mod tasks;

pub use config::{Config, PrinterBackendKind};
pub use error::{PanelError, PanelResult};
pub use runtime::{PanelHandle, spawn_panel};
pub use tasks::{BackgroundTasks, TaskKind};
