//! Panel configuration
//!
//! All knobs load from environment variables with defaults that match the
//! production deployment:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | FEED_URL | http://localhost:54321 | Data-platform REST base URL |
//! | FEED_REALTIME_URL | ws://localhost:54321/realtime/v1/websocket | Push feed endpoint |
//! | FEED_API_KEY | (empty) | Feed API key |
//! | OPERATOR_ID | (unset) | Fixed operator identity for headless runs |
//! | RETENTION_WINDOW_SECS | 3600 | How long orders stay on the panel |
//! | SWEEP_INTERVAL_SECS | 300 | Eviction sweep period |
//! | DEDUP_MARGIN_SECS | 3600 | Extra dedup retention past the window |
//! | PRINTER_BACKEND | bridge | `bridge` or `agent` |
//! | BRIDGE_URL | ws://127.0.0.1:8182 | Local print-bridge endpoint |
//! | BRIDGE_PRINTER_NAME | POS-80 | Named printer config at the bridge |
//! | BRIDGE_POLL_MS | 100 | Bridge discovery poll interval |
//! | BRIDGE_POLL_ATTEMPTS | 50 | Bridge discovery attempt budget |
//! | AGENT_URL | ws://127.0.0.1:12345 | Remote print-agent endpoint |
//! | SOUND_ENABLED | false | Alert sound initial state |

use std::time::Duration;

/// Which printing backend is wired in (configuration, never runtime
/// negotiation)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrinterBackendKind {
    Bridge,
    Agent,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Data-platform REST base URL
    pub feed_url: String,
    /// Push feed WebSocket endpoint
    pub feed_realtime_url: String,
    /// Feed API key
    pub feed_api_key: String,
    /// Fixed operator identity (headless runs; normally arrives from login)
    pub operator_id: Option<String>,

    /// Orders older than this are evicted from the panel
    pub retention_window_secs: u64,
    /// Eviction sweep period
    pub sweep_interval_secs: u64,
    /// Dedup keys are kept this much longer than the retention window
    pub dedup_margin_secs: u64,

    /// Active printing backend
    pub printer_backend: PrinterBackendKind,
    pub bridge_url: String,
    pub bridge_printer_name: String,
    pub bridge_poll_ms: u64,
    pub bridge_poll_attempts: u32,
    pub agent_url: String,

    /// Alert sound initial state
    pub sound_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            feed_url: env_or("FEED_URL", "http://localhost:54321"),
            feed_realtime_url: env_or(
                "FEED_REALTIME_URL",
                "ws://localhost:54321/realtime/v1/websocket",
            ),
            feed_api_key: env_or("FEED_API_KEY", ""),
            operator_id: std::env::var("OPERATOR_ID").ok().filter(|s| !s.is_empty()),

            retention_window_secs: env_parse("RETENTION_WINDOW_SECS", 3600),
            sweep_interval_secs: env_parse("SWEEP_INTERVAL_SECS", 300),
            dedup_margin_secs: env_parse("DEDUP_MARGIN_SECS", 3600),

            printer_backend: match env_or("PRINTER_BACKEND", "bridge").as_str() {
                "agent" => PrinterBackendKind::Agent,
                _ => PrinterBackendKind::Bridge,
            },
            bridge_url: env_or("BRIDGE_URL", "ws://127.0.0.1:8182"),
            bridge_printer_name: env_or("BRIDGE_PRINTER_NAME", "POS-80"),
            bridge_poll_ms: env_parse("BRIDGE_POLL_MS", 100),
            bridge_poll_attempts: env_parse("BRIDGE_POLL_ATTEMPTS", 50),
            agent_url: env_or("AGENT_URL", "ws://127.0.0.1:12345"),

            sound_enabled: env_parse("SOUND_ENABLED", false),
        }
    }

    pub fn retention_window(&self) -> Duration {
        Duration::from_secs(self.retention_window_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn dedup_margin(&self) -> Duration {
        Duration::from_secs(self.dedup_margin_secs)
    }

    pub fn bridge_poll_interval(&self) -> Duration {
        Duration::from_millis(self.bridge_poll_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
