//! Alert controller
//!
//! Owns the operator-toggleable sound flag and drives the audio cue. The
//! cue itself is an injected capability: the panel process does not decode
//! audio, it signals whatever plays the fixed alert asset (the desktop
//! display layer in production, a recorder in tests).

use crate::panel::status::{STATUS_NEW_ORDER, STATUS_SOUND_OFF, STATUS_SOUND_ON, StatusLine};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Signal sent to the cue player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSignal {
    /// Restart the cue from the beginning, stopping any in-flight playback
    /// (rapid-fire orders must never overlap audio)
    Play,
}

/// Something that can play the alert cue
///
/// `play` restarts playback; calling it while the cue is already playing
/// stops the in-flight one first.
pub trait AlertCue: Send + Sync {
    fn play(&self);
}

/// Production cue: broadcast the play signal to the display layer
pub struct BroadcastCue {
    tx: broadcast::Sender<AlertSignal>,
}

impl BroadcastCue {
    pub fn new() -> (Self, broadcast::Receiver<AlertSignal>) {
        let (tx, rx) = broadcast::channel(8);
        (Self { tx }, rx)
    }
}

impl AlertCue for BroadcastCue {
    fn play(&self) {
        // No player attached is fine; the flag state is what matters
        let _ = self.tx.send(AlertSignal::Play);
    }
}

pub struct AlertController {
    sound_enabled: bool,
    cue: Arc<dyn AlertCue>,
}

impl AlertController {
    pub fn new(sound_enabled: bool, cue: Arc<dyn AlertCue>) -> Self {
        Self { sound_enabled, cue }
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    /// Flip the sound flag
    ///
    /// Enabling plays one cue immediately as feedback that the toggle
    /// worked, independent of order arrival.
    pub fn toggle(&mut self, status: &mut StatusLine) -> bool {
        self.sound_enabled = !self.sound_enabled;
        if self.sound_enabled {
            status.set(STATUS_SOUND_ON);
            self.cue.play();
        } else {
            status.set(STATUS_SOUND_OFF);
        }
        debug!(sound_enabled = self.sound_enabled, "Alert sound toggled");
        self.sound_enabled
    }

    /// React to one accepted admission
    pub fn on_new_order(&self, status: &mut StatusLine) {
        status.set(STATUS_NEW_ORDER);
        if self.sound_enabled {
            self.cue.play();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RecordingCue {
        plays: AtomicUsize,
    }

    impl RecordingCue {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                plays: AtomicUsize::new(0),
            })
        }

        fn count(&self) -> usize {
            self.plays.load(Ordering::SeqCst)
        }
    }

    impl AlertCue for RecordingCue {
        fn play(&self) {
            self.plays.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_toggle_on_plays_exactly_once() {
        let cue = RecordingCue::new();
        let (mut status, _rx) = StatusLine::new();
        let mut ctrl = AlertController::new(false, Arc::clone(&cue) as Arc<dyn AlertCue>);

        assert!(ctrl.toggle(&mut status));
        assert_eq!(cue.count(), 1);
    }

    #[tokio::test]
    async fn test_toggle_off_plays_nothing() {
        let cue = RecordingCue::new();
        let (mut status, _rx) = StatusLine::new();
        let mut ctrl = AlertController::new(true, Arc::clone(&cue) as Arc<dyn AlertCue>);

        assert!(!ctrl.toggle(&mut status));
        assert_eq!(cue.count(), 0);
    }

    #[tokio::test]
    async fn test_new_order_respects_flag() {
        let cue = RecordingCue::new();
        let (mut status, rx) = StatusLine::new();
        let mut ctrl = AlertController::new(false, Arc::clone(&cue) as Arc<dyn AlertCue>);

        ctrl.on_new_order(&mut status);
        assert_eq!(cue.count(), 0);
        assert_eq!(*rx.borrow(), STATUS_NEW_ORDER);

        ctrl.toggle(&mut status); // on, plays once
        ctrl.on_new_order(&mut status);
        assert_eq!(cue.count(), 2);
    }
}
