//! Tracker service: orchestrates index mutations and emits events.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{EventBus, EventWindow, IndexEvent, SwapIndex, SwapRecord};

/// Orchestration layer for every index mutation.
///
/// Owns references to [`SwapIndex`] for state and [`EventBus`] for event
/// emission. Mutations follow the pattern: mutate the index, then publish
/// an [`IndexEvent`] if anything changed.
#[derive(Debug, Clone)]
pub struct TrackerService {
    index: Arc<SwapIndex>,
    event_bus: EventBus,
}

impl TrackerService {
    /// Creates a new `TrackerService`.
    #[must_use]
    pub fn new(index: Arc<SwapIndex>, event_bus: EventBus) -> Self {
        Self { index, event_bus }
    }

    /// Returns a reference to the inner [`SwapIndex`].
    #[must_use]
    pub fn index(&self) -> &Arc<SwapIndex> {
        &self.index
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Indexes a completed swap.
    ///
    /// Returns `true` if the swap was new. Re-ingesting a known uuid or an
    /// unfinished swap is a silent no-op.
    pub fn ingest(&self, record: SwapRecord) -> bool {
        let uuid = record.uuid.clone();
        let pair = record.pair_key().to_string();
        let finished_at = record.finished_at;

        if !self.index.upsert(record) {
            return false;
        }

        let total = self.index.total_count();
        let _ = self.event_bus.publish(IndexEvent::SwapIngested {
            uuid: uuid.clone(),
            pair: pair.clone(),
            finished_at: finished_at.unwrap_or_default(),
            total,
            timestamp: Utc::now(),
        });
        tracing::debug!(%uuid, %pair, total, "swap indexed");
        true
    }

    /// Runs a retention sweep against the current wall clock.
    pub fn prune_now(&self) -> usize {
        self.prune_at(Utc::now().timestamp())
    }

    /// Runs a retention sweep as of `now` (unix seconds).
    ///
    /// Publishes [`IndexEvent::SwapsPruned`] when anything was removed.
    pub fn prune_at(&self, now: i64) -> usize {
        let removed = self.index.prune(now);
        if removed > 0 {
            let total = self.index.total_count();
            let _ = self.event_bus.publish(IndexEvent::SwapsPruned {
                removed,
                total,
                timestamp: Utc::now(),
            });
            tracing::info!(removed, total, "retention sweep evicted swaps");
        }
        removed
    }

    /// Replaces the registered event windows.
    pub fn set_event_windows(&self, windows: Vec<EventWindow>) {
        tracing::info!(count = windows.len(), "event windows registered");
        self.index.set_event_windows(windows);
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::swap_record::test_support::{dec, swap};

    fn service(retention: i64) -> TrackerService {
        TrackerService::new(Arc::new(SwapIndex::new(retention)), EventBus::new(16))
    }

    #[test]
    fn ingest_publishes_once_per_new_swap() {
        let svc = service(3600);
        let mut rx = svc.event_bus().subscribe();

        assert!(svc.ingest(swap("u1", "KMD", "DGB", 100, dec("1"), dec("2"))));
        assert!(!svc.ingest(swap("u1", "KMD", "DGB", 100, dec("1"), dec("2"))));

        let Ok(event) = rx.try_recv() else {
            panic!("expected SwapIngested");
        };
        let IndexEvent::SwapIngested { uuid, pair, total, .. } = event else {
            panic!("wrong event type");
        };
        assert_eq!(uuid, "u1");
        assert_eq!(pair, "KMD|DGB");
        assert_eq!(total, 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn unfinished_swap_is_not_published() {
        let svc = service(3600);
        let mut rx = svc.event_bus().subscribe();
        let mut s = swap("u1", "KMD", "DGB", 100, dec("1"), dec("2"));
        s.finished_at = None;
        assert!(!svc.ingest(s));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn prune_publishes_only_when_something_was_removed() {
        let svc = service(100);
        svc.ingest(swap("old", "KMD", "DGB", 100, dec("1"), dec("1")));
        svc.ingest(swap("new", "KMD", "DGB", 900, dec("1"), dec("1")));
        let mut rx = svc.event_bus().subscribe();

        assert_eq!(svc.prune_at(500), 1);
        assert_eq!(svc.prune_at(500), 0);

        let Ok(IndexEvent::SwapsPruned { removed, total, .. }) = rx.try_recv() else {
            panic!("expected SwapsPruned");
        };
        assert_eq!((removed, total), (1, 1));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn event_windows_protect_through_the_service() {
        let svc = service(0);
        let Ok(window) = EventWindow::new("E", 0, 200, "KMD", "DGB") else {
            panic!("valid window");
        };
        svc.set_event_windows(vec![window]);
        svc.ingest(swap("kept", "DGB", "KMD", 150, dec("1"), dec("1")));
        svc.ingest(swap("gone", "KMD", "LTC", 150, dec("1"), dec("1")));
        assert_eq!(svc.prune_at(1_000), 1);
        assert!(svc.index().get("kept").is_some());
    }
}
