//! In-memory order store
//!
//! The windowed, newest-first collection of currently displayed orders.
//! Exclusively owned and mutated by the intake worker; the display layer
//! observes read-only snapshots through a watch channel (strict one-way
//! data flow).

use crate::model::Order;
use std::sync::Arc;
use tokio::sync::watch;

pub struct OrderStore {
    orders: Vec<Order>,
    snapshot_tx: watch::Sender<Arc<[Order]>>,
}

impl OrderStore {
    /// Create an empty store and the read side for the display layer
    pub fn new() -> (Self, watch::Receiver<Arc<[Order]>>) {
        let (snapshot_tx, snapshot_rx) =
            watch::channel(Arc::from(Vec::<Order>::new().into_boxed_slice()));
        (
            Self {
                orders: Vec::new(),
                snapshot_tx,
            },
            snapshot_rx,
        )
    }

    /// Insert a new order at the front (newest-first display invariant)
    pub fn prepend(&mut self, order: Order) {
        self.orders.insert(0, order);
        self.publish();
    }

    /// Evict everything older than `cutoff`
    ///
    /// Snapshot-then-filter: the surviving list is computed in full before
    /// it replaces the current one, so an order admitted in the same tick
    /// is never dropped halfway through.
    pub fn retain_since(&mut self, cutoff: chrono::DateTime<chrono::Utc>) -> usize {
        let survivors: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| o.created_at >= cutoff)
            .cloned()
            .collect();
        let evicted = self.orders.len() - survivors.len();
        if evicted > 0 {
            self.orders = survivors;
            self.publish();
        }
        evicted
    }

    /// Drop everything and publish the empty panel
    pub fn clear(&mut self) {
        if !self.orders.is_empty() {
            self.orders.clear();
            self.publish();
        }
    }

    /// Most recent order, if any
    pub fn front(&self) -> Option<&Order> {
        self.orders.first()
    }

    /// Look up a displayed order by store id (manual re-dispatch)
    pub fn find(&self, id: i64) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(Arc::from(self.orders.as_slice()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn order(id: i64, created_at: chrono::DateTime<Utc>) -> Order {
        serde_json::from_value(json!({
            "id": id,
            "created_at": created_at.to_rfc3339(),
        }))
        .unwrap()
    }

    #[test]
    fn test_prepend_keeps_newest_first() {
        let (mut store, rx) = OrderStore::new();
        let now = Utc::now();
        store.prepend(order(1, now));
        store.prepend(order(2, now + Duration::seconds(1)));

        assert_eq!(store.front().map(|o| o.id), Some(2));
        let snapshot = rx.borrow();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id, 2);
    }

    #[test]
    fn test_retain_since_evicts_old_orders() {
        let (mut store, rx) = OrderStore::new();
        let now = Utc::now();
        store.prepend(order(1, now - Duration::hours(2)));
        store.prepend(order(2, now));

        let evicted = store.retain_since(now - Duration::hours(1));
        assert_eq!(evicted, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(rx.borrow().len(), 1);
        assert!(store.find(1).is_none());
        assert!(store.find(2).is_some());
    }
}
