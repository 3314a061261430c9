//! Panel state and intake pipeline
//!
//! Everything the operator sees lives here: the order store, the dedup
//! window, the alert flag and the status line, all owned by the single
//! intake worker.

pub mod alert;
pub mod status;
pub mod store;
pub mod window;
pub mod worker;

pub use alert::{AlertController, AlertCue, AlertSignal, BroadcastCue};
pub use status::{STATUS_IDLE, StatusLine};
pub use store::OrderStore;
pub use window::{Admission, IntakeWindow, SweepStats};
pub use worker::{PanelCommand, PanelWorker};
