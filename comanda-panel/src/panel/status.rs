//! Operator status line
//!
//! One transient human-readable message at a time, observed by the display
//! layer through a watch channel. Every non-idle message self-clears back
//! to the idle prompt after a fixed delay; setting a new message aborts the
//! previous pending clear, so the most recent transition always wins and a
//! stale timer can never overwrite a newer status.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Idle prompt between events
pub const STATUS_IDLE: &str = "📡 Aguardando novos pedidos...";
/// Shown on every accepted admission
pub const STATUS_NEW_ORDER: &str = "📦 Novo pedido recebido!";
/// Shown when the alert sound is toggled
pub const STATUS_SOUND_ON: &str = "🔊 Som ativado com sucesso!";
pub const STATUS_SOUND_OFF: &str = "🔇 Som desativado!";
/// Shown when the feed cannot be reached
pub const STATUS_FEED_ERROR: &str = "⚠️ Falha ao carregar pedidos";

/// How long a transient message stays up
const CLEAR_AFTER: Duration = Duration::from_secs(3);

pub struct StatusLine {
    tx: watch::Sender<String>,
    clear_after: Duration,
    /// Bumped on every `set`; a pending clear only fires if it is still
    /// the newest one (abort alone cannot stop a task already past its
    /// sleep on a multi-threaded runtime)
    epoch: Arc<AtomicU64>,
    pending_clear: Option<JoinHandle<()>>,
}

impl StatusLine {
    /// Create the status line and its read side
    pub fn new() -> (Self, watch::Receiver<String>) {
        let (tx, rx) = watch::channel(STATUS_IDLE.to_string());
        (
            Self {
                tx,
                clear_after: CLEAR_AFTER,
                epoch: Arc::new(AtomicU64::new(0)),
                pending_clear: None,
            },
            rx,
        )
    }

    #[cfg(test)]
    fn with_clear_after(mut self, delay: Duration) -> Self {
        self.clear_after = delay;
        self
    }

    /// Publish a transient message; it self-clears back to idle
    pub fn set(&mut self, msg: impl Into<String>) {
        // Latest wins: a pending clear for an older message must not fire
        if let Some(handle) = self.pending_clear.take() {
            handle.abort();
        }

        // Bump before publishing, so a stale clear that raced past its
        // abort sees the new epoch and backs off
        let armed = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.tx.send_replace(msg.into());

        self.pending_clear = Some(arm_clear(
            self.tx.clone(),
            Arc::clone(&self.epoch),
            armed,
            self.clear_after,
        ));
    }
}

/// Clear back to idle after `delay`, unless a newer message re-armed the
/// line in the meantime
///
/// The epoch check runs inside the watch closure, under the same lock a
/// concurrent `set` publishes through, so check-then-clear cannot
/// interleave with a newer message.
fn arm_clear(
    tx: watch::Sender<String>,
    epoch: Arc<AtomicU64>,
    armed: u64,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        tx.send_if_modified(|current| {
            if epoch.load(Ordering::SeqCst) == armed {
                *current = STATUS_IDLE.to_string();
                true
            } else {
                false
            }
        });
    })
}

impl Drop for StatusLine {
    fn drop(&mut self) {
        if let Some(handle) = self.pending_clear.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_message_self_clears() {
        let (line, rx) = StatusLine::new();
        let mut line = line.with_clear_after(Duration::from_secs(3));

        line.set(STATUS_NEW_ORDER);
        assert_eq!(*rx.borrow(), STATUS_NEW_ORDER);

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(*rx.borrow(), STATUS_IDLE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_message_wins_over_stale_timer() {
        let (line, rx) = StatusLine::new();
        let mut line = line.with_clear_after(Duration::from_secs(3));

        line.set(STATUS_SOUND_ON);
        tokio::time::sleep(Duration::from_secs(2)).await;

        // Newer message one second before the first clear would fire
        line.set(STATUS_NEW_ORDER);
        tokio::time::sleep(Duration::from_secs(2)).await;

        // The first message's timer must not have cleared the newer one
        assert_eq!(*rx.borrow(), STATUS_NEW_ORDER);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(*rx.borrow(), STATUS_IDLE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overtaken_clear_backs_off() {
        // A timer that survives its abort (already awake on another
        // runtime thread) must still leave a newer message alone
        let (tx, rx) = watch::channel(STATUS_NEW_ORDER.to_string());
        let epoch = Arc::new(AtomicU64::new(1));
        let handle = arm_clear(tx.clone(), Arc::clone(&epoch), 1, Duration::from_secs(3));

        // A newer set arrives while the timer is pending
        epoch.store(2, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_secs(4)).await;
        handle.await.unwrap();
        assert_eq!(*rx.borrow(), STATUS_NEW_ORDER);
    }

    #[tokio::test(start_paused = true)]
    async fn test_current_clear_still_fires() {
        let (tx, rx) = watch::channel(STATUS_NEW_ORDER.to_string());
        let epoch = Arc::new(AtomicU64::new(1));
        let handle = arm_clear(tx.clone(), Arc::clone(&epoch), 1, Duration::from_secs(3));

        tokio::time::sleep(Duration::from_secs(4)).await;
        handle.await.unwrap();
        assert_eq!(*rx.borrow(), STATUS_IDLE);
    }
}
