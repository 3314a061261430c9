//! Comanda Panel - back-office order intake and receipt dispatch
//!
//! # Architecture
//!
//! Orders flow from the storefront's data platform into a single intake
//! worker that deduplicates them, keeps a rolling one-hour window on
//! display, raises the operator alert and dispatches a kitchen receipt:
//!
//! - **Feed** (`feed`): initial window fetch plus a realtime push
//!   subscription, scoped to one operator
//! - **Panel** (`panel`): order store, dedup window, alert controller,
//!   status line and the intake worker that owns them
//! - **Printing** (`printing`): receipt rendering and backend dispatch
//!   (local print bridge or remote agent, via `comanda-printer`)
//! - **Core** (`core`): configuration, errors, background tasks and the
//!   runtime assembly that wires everything together
//!
//! # Module structure
//!
//! ```text
//! comanda-panel/src/
//! ├── core/          # config, errors, tasks, runtime assembly
//! ├── feed/          # order feed trait + realtime implementation
//! ├── panel/         # store, window, alert, status, intake worker
//! ├── printing/      # receipt renderer + dispatcher
//! ├── utils/         # logging
//! └── model.rs       # wire-level order model
//! ```

pub mod core;
pub mod feed;
pub mod model;
pub mod panel;
pub mod printing;
pub mod utils;

pub use core::{BackgroundTasks, Config, PanelError, PanelHandle, PanelResult, spawn_panel};
pub use feed::{OrderFeed, OrderStream, RealtimeFeed};
pub use model::{OperatorId, Order};
pub use panel::{AlertSignal, PanelCommand};
pub use printing::PrintDispatcher;
pub use utils::{init_logger, init_logger_with_file};
