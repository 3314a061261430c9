//! Dedup and retention window
//!
//! Gate between the feed and the order store. Every inbound event passes
//! through [`IntakeWindow::admit`]; a periodic [`IntakeWindow::sweep`]
//! evicts aged-out orders from the store while the dedup set keeps its keys
//! past eviction, so a replayed event can never resurrect an evicted order.

use crate::model::{DedupKey, Order};
use crate::panel::store::OrderStore;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::debug;

/// Outcome of admitting one inbound event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// New order inside the window; inserted into the store
    Accepted,
    /// Key already seen this session; no mutation
    Duplicate,
    /// Older than the window at arrival; key recorded, never displayed
    Expired,
}

/// Sweep statistics, for logs
#[derive(Debug, Default, Clone, Copy)]
pub struct SweepStats {
    pub evicted: usize,
    pub compacted_keys: usize,
}

pub struct IntakeWindow {
    window: Duration,
    /// Dedup keys survive eviction by this much beyond the window before
    /// they are compacted away (bounds set growth over long sessions)
    margin: Duration,
    seen: HashMap<DedupKey, DateTime<Utc>>,
    store: OrderStore,
}

impl IntakeWindow {
    pub fn new(window: Duration, margin: Duration, store: OrderStore) -> Self {
        Self {
            window,
            margin,
            seen: HashMap::new(),
            store,
        }
    }

    pub fn retention(&self) -> Duration {
        self.window
    }

    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    /// Admit one inbound order event
    pub fn admit(&mut self, order: Order, now: DateTime<Utc>) -> Admission {
        let key = order.dedup_key();
        if self.seen.contains_key(&key) {
            return Admission::Duplicate;
        }

        // Record the key even when the order is too old to display, so a
        // late duplicate is still filtered
        self.seen.insert(key, order.created_at);

        if order.created_at < now - self.window {
            return Admission::Expired;
        }

        self.store.prepend(order);
        Admission::Accepted
    }

    /// Evict displayed orders older than the window and compact dedup keys
    /// older than window + margin
    pub fn sweep(&mut self, now: DateTime<Utc>) -> SweepStats {
        let cutoff = now - self.window;
        let evicted = self.store.retain_since(cutoff);

        let compact_cutoff = cutoff - self.margin;
        let before = self.seen.len();
        self.seen.retain(|_, created_at| *created_at >= compact_cutoff);
        let compacted_keys = before - self.seen.len();

        if evicted > 0 || compacted_keys > 0 {
            debug!(evicted, compacted_keys, remaining = self.store.len(), "Sweep done");
        }

        SweepStats {
            evicted,
            compacted_keys,
        }
    }

    /// Forget everything - store and seen set
    ///
    /// The panel is scoped to one operator; an identity change must not
    /// carry the previous operator's orders or dedup history over.
    pub fn reset(&mut self) {
        self.seen.clear();
        self.store.clear();
    }

    #[cfg(test)]
    fn seen_len(&self) -> usize {
        self.seen.len()
    }
}
