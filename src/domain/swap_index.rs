//! Concurrent in-memory index of completed swaps.
//!
//! [`SwapIndex`] keeps every known swap in a primary `uuid -> record` map
//! plus one time-ordered bucket per directional coin pair. Range queries
//! binary-search a bucket for `[start, stop]` and resolve the matching
//! uuids through the primary map.
//!
//! # Concurrency
//!
//! One [`parking_lot::RwLock`] guards the primary map, every bucket and the
//! registered event windows. Mutations (`upsert`, `prune`,
//! `set_event_windows`) take it exclusively for their full duration, reads
//! share it. No work under the lock awaits, so the lock is synchronous.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use super::event_window::EventWindow;
use super::swap_record::{SwapRecord, decimal_to_f64};
use super::symbol::PairKey;

/// Bucket entry ordered by completion time, then uuid.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct TimedEntry {
    finished_at: i64,
    uuid: Arc<str>,
}

#[derive(Debug, Default)]
struct IndexState {
    swaps: HashMap<Arc<str>, Arc<SwapRecord>>,
    by_pair: HashMap<PairKey, Vec<TimedEntry>>,
    events: Vec<EventWindow>,
}

impl IndexState {
    /// Entries of one bucket with `start <= finished_at <= stop`.
    fn range(&self, key: &PairKey, start: i64, stop: i64) -> &[TimedEntry] {
        let Some(bucket) = self.by_pair.get(key) else {
            return &[];
        };
        let lo = bucket.partition_point(|e| e.finished_at < start);
        let hi = bucket.partition_point(|e| e.finished_at <= stop);
        bucket.get(lo..hi).unwrap_or(&[])
    }
}

/// Directional aggregate over one `MAKER|TAKER` bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairStats {
    /// Canonical maker coin.
    pub maker_coin: String,
    /// Canonical taker coin.
    pub taker_coin: String,
    /// Inclusive window start.
    pub start: i64,
    /// Inclusive window stop.
    pub stop: i64,
    /// Number of swaps in the window.
    pub total_swaps: usize,
    /// Sum of maker amounts.
    pub maker_amount_sum: f64,
    /// Sum of taker amounts.
    pub taker_amount_sum: f64,
}

/// Swap index with retention-based eviction.
///
/// Created once at startup and shared behind an `Arc`.
#[derive(Debug)]
pub struct SwapIndex {
    retention_secs: i64,
    state: RwLock<IndexState>,
}

impl SwapIndex {
    /// Creates an empty index that evicts swaps older than
    /// `retention_secs` unless an event window protects them.
    #[must_use]
    pub fn new(retention_secs: i64) -> Self {
        Self {
            retention_secs: retention_secs.max(0),
            state: RwLock::new(IndexState::default()),
        }
    }

    /// Retention horizon in seconds.
    #[must_use]
    pub const fn retention_secs(&self) -> i64 {
        self.retention_secs
    }

    /// Inserts a completed swap.
    ///
    /// Returns `false` without touching the index when the swap has no
    /// `finished_at` yet or its uuid is already known; re-deliveries are
    /// never treated as updates.
    pub fn upsert(&self, record: SwapRecord) -> bool {
        let Some(finished_at) = record.finished_at else {
            tracing::debug!(uuid = %record.uuid, "swap still in flight, not indexed");
            return false;
        };
        let key = record.pair_key();

        let mut state = self.state.write();
        if state.swaps.contains_key(record.uuid.as_str()) {
            return false;
        }

        let uuid: Arc<str> = Arc::from(record.uuid.as_str());
        let entry = TimedEntry {
            finished_at,
            uuid: Arc::clone(&uuid),
        };
        let bucket = state.by_pair.entry(key).or_default();
        let pos = bucket.binary_search(&entry).unwrap_or_else(|pos| pos);
        bucket.insert(pos, entry);
        state.swaps.insert(uuid, Arc::new(record));
        true
    }

    /// Looks up a swap by uuid.
    #[must_use]
    pub fn get(&self, uuid: &str) -> Option<Arc<SwapRecord>> {
        self.state.read().swaps.get(uuid).cloned()
    }

    /// Number of indexed swaps.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.state.read().swaps.len()
    }

    /// Number of non-empty directional buckets.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.state.read().by_pair.len()
    }

    /// Swaps between two coins in either direction that finished inside
    /// `[start, stop]`, most recent first.
    ///
    /// Bucket entries whose record is gone are skipped.
    #[must_use]
    pub fn swaps_for_pair(
        &self,
        coin_a: &str,
        coin_b: &str,
        start: i64,
        stop: i64,
    ) -> Vec<Arc<SwapRecord>> {
        let forward = PairKey::new(coin_a, coin_b);
        let backward = forward.reversed();

        let state = self.state.read();
        let mut entries: Vec<&TimedEntry> = state.range(&forward, start, stop).iter().collect();
        if backward != forward {
            entries.extend(state.range(&backward, start, stop));
        }
        entries.sort_unstable_by(|a, b| b.cmp(a));

        entries
            .into_iter()
            .filter_map(|e| state.swaps.get(&e.uuid).cloned())
            .collect()
    }

    /// Count and amount sums for the single direction `maker -> taker`.
    #[must_use]
    pub fn stats_for_pair(&self, maker: &str, taker: &str, start: i64, stop: i64) -> PairStats {
        let key = PairKey::new(maker, taker);
        let state = self.state.read();

        let mut total_swaps = 0;
        let mut maker_amount_sum = 0.0;
        let mut taker_amount_sum = 0.0;
        for entry in state.range(&key, start, stop) {
            let Some(swap) = state.swaps.get(&entry.uuid) else {
                continue;
            };
            total_swaps += 1;
            maker_amount_sum += decimal_to_f64(&swap.maker_amount);
            taker_amount_sum += decimal_to_f64(&swap.taker_amount);
        }

        PairStats {
            maker_coin: key.maker().to_string(),
            taker_coin: key.taker().to_string(),
            start,
            stop,
            total_swaps,
            maker_amount_sum,
            taker_amount_sum,
        }
    }

    /// Replaces the registered event windows wholesale.
    pub fn set_event_windows(&self, windows: Vec<EventWindow>) {
        self.state.write().events = windows;
    }

    /// Snapshot of the registered event windows.
    #[must_use]
    pub fn event_windows(&self) -> Vec<EventWindow> {
        self.state.read().events.clone()
    }

    /// Looks up a registered event window by name.
    #[must_use]
    pub fn event_window(&self, name: &str) -> Option<EventWindow> {
        self.state
            .read()
            .events
            .iter()
            .find(|w| w.name == name)
            .cloned()
    }

    /// Evicts swaps that finished at or before `now - retention` and are
    /// not covered by any event window on their pair. Returns the number
    /// of swaps removed.
    pub fn prune(&self, now: i64) -> usize {
        let cutoff = now.saturating_sub(self.retention_secs);

        let mut guard = self.state.write();
        let IndexState {
            swaps,
            by_pair,
            events,
        } = &mut *guard;

        let mut doomed: HashSet<Arc<str>> = HashSet::new();
        let mut touched: HashSet<PairKey> = HashSet::new();
        for (uuid, swap) in swaps.iter() {
            let Some(finished_at) = swap.finished_at else {
                tracing::warn!(uuid = %uuid, "indexed swap has no finished_at, skipping");
                continue;
            };
            if finished_at > cutoff {
                continue;
            }
            let key = swap.pair_key();
            let protected = events.iter().any(|w| {
                w.contains(finished_at) && w.matches_canonical(key.maker(), key.taker())
            });
            if protected {
                continue;
            }
            doomed.insert(Arc::clone(uuid));
            touched.insert(key);
        }

        if doomed.is_empty() {
            return 0;
        }

        for uuid in &doomed {
            swaps.remove(uuid);
        }
        for key in &touched {
            let emptied = match by_pair.get_mut(key) {
                Some(bucket) => {
                    bucket.retain(|e| !doomed.contains(&e.uuid));
                    bucket.is_empty()
                }
                None => false,
            };
            if emptied {
                by_pair.remove(key);
            }
        }

        tracing::debug!(removed = doomed.len(), cutoff, "pruned swap index");
        doomed.len()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::swap_record::test_support::{dec, swap};

    fn window(start: i64, stop: i64, base: &str, rel: &str) -> EventWindow {
        let Ok(w) = EventWindow::new("E", start, stop, base, rel) else {
            panic!("valid window");
        };
        w
    }

    fn uuids(rows: &[Arc<SwapRecord>]) -> Vec<&str> {
        rows.iter().map(|r| r.uuid.as_str()).collect()
    }

    #[test]
    fn upsert_is_idempotent() {
        let index = SwapIndex::new(3600);
        let first = swap("u1", "KMD", "DGB", 100, dec("1"), dec("2"));
        let mut second = first.clone();
        second.maker_amount = dec("99");

        assert!(index.upsert(first.clone()));
        assert!(!index.upsert(second));
        assert_eq!(index.total_count(), 1);
        let Some(stored) = index.get("u1") else {
            panic!("swap present");
        };
        assert_eq!(*stored, first);
    }

    #[test]
    fn unfinished_swap_is_rejected() {
        let index = SwapIndex::new(3600);
        let mut record = swap("u1", "KMD", "DGB", 100, dec("1"), dec("2"));
        record.finished_at = None;
        assert!(!index.upsert(record));
        assert_eq!(index.total_count(), 0);
        assert!(index.get("u1").is_none());
    }

    #[test]
    fn merges_both_directions_most_recent_first() {
        let index = SwapIndex::new(3600);
        index.upsert(swap("u1", "KMD", "DGB", 200, dec("1"), dec("2")));
        index.upsert(swap("u2", "DGB", "KMD", 300, dec("3"), dec("4")));
        index.upsert(swap("u3", "KMD", "LTC", 250, dec("3"), dec("4")));

        let rows = index.swaps_for_pair("KMD", "DGB", 100, 1000);
        assert_eq!(uuids(&rows), vec!["u2", "u1"]);
        let rows = index.swaps_for_pair("dgb", "kmd", 100, 1000);
        assert_eq!(uuids(&rows), vec!["u2", "u1"]);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let index = SwapIndex::new(3600);
        index.upsert(swap("at_start", "KMD", "DGB", 100, dec("1"), dec("1")));
        index.upsert(swap("at_stop", "DGB", "KMD", 200, dec("1"), dec("1")));
        index.upsert(swap("before", "KMD", "DGB", 99, dec("1"), dec("1")));
        index.upsert(swap("after", "KMD", "DGB", 201, dec("1"), dec("1")));

        let rows = index.swaps_for_pair("KMD", "DGB", 100, 200);
        assert_eq!(uuids(&rows), vec!["at_stop", "at_start"]);
    }

    #[test]
    fn out_of_order_ingestion_keeps_buckets_sorted() {
        let index = SwapIndex::new(3600);
        for (uuid, ts) in [("c", 300), ("a", 100), ("b", 200), ("d", 200)] {
            index.upsert(swap(uuid, "KMD", "DGB", ts, dec("1"), dec("1")));
        }
        let rows = index.swaps_for_pair("KMD", "DGB", 0, 1000);
        assert_eq!(uuids(&rows), vec!["c", "d", "b", "a"]);
        let rows = index.swaps_for_pair("KMD", "DGB", 150, 250);
        assert_eq!(uuids(&rows), vec!["d", "b"]);
    }

    #[test]
    fn suffixed_and_ticker_symbols_share_a_bucket() {
        let index = SwapIndex::new(3600);
        index.upsert(swap("u1", "DGB-segwit", "KMD", 100, dec("1"), dec("1")));
        let mut with_ticker = swap("u2", "DGB-segwit", "KMD", 110, dec("1"), dec("1"));
        with_ticker.maker_coin_ticker = Some("dgb".to_string());
        index.upsert(with_ticker);

        assert_eq!(index.pair_count(), 1);
        let rows = index.swaps_for_pair("DGB", "KMD", 0, 1000);
        assert_eq!(uuids(&rows), vec!["u2", "u1"]);
    }

    #[test]
    fn stats_for_pair_is_single_direction() {
        let index = SwapIndex::new(3600);
        index.upsert(swap("u1", "KMD", "DGB", 100, dec("1.5"), dec("2")));
        index.upsert(swap("u2", "KMD", "DGB", 150, dec("0.25"), dec("3")));
        index.upsert(swap("u3", "DGB", "KMD", 120, dec("7"), dec("7")));

        let stats = index.stats_for_pair("kmd", "dgb", 100, 150);
        assert_eq!(stats.maker_coin, "KMD");
        assert_eq!(stats.taker_coin, "DGB");
        assert_eq!(stats.total_swaps, 2);
        assert!((stats.maker_amount_sum - 1.75).abs() < f64::EPSILON);
        assert!((stats.taker_amount_sum - 5.0).abs() < f64::EPSILON);

        let empty = index.stats_for_pair("KMD", "BTC", 0, 1000);
        assert_eq!(empty.total_swaps, 0);
        assert!(empty.maker_amount_sum.abs() < f64::EPSILON);
    }

    #[test]
    fn prune_respects_retention_and_event_windows() {
        let index = SwapIndex::new(3600);
        let now = 1_700_000_000;
        let old_ts = now - 7200;
        index.upsert(swap("old", "KMD", "DGB", old_ts, dec("1"), dec("1")));
        index.upsert(swap("new", "KMD", "DGB", now - 60, dec("1"), dec("1")));

        index.set_event_windows(vec![window(old_ts - 10, old_ts + 10, "DGB", "KMD")]);
        assert_eq!(index.prune(now), 0);
        assert!(index.get("old").is_some());

        index.set_event_windows(Vec::new());
        assert_eq!(index.prune(now), 1);
        assert!(index.get("new").is_some());
        assert!(index.get("old").is_none());
        assert_eq!(uuids(&index.swaps_for_pair("KMD", "DGB", 0, now)), vec!["new"]);
    }

    #[test]
    fn protection_uses_canonical_symbols() {
        let index = SwapIndex::new(60);
        index.upsert(swap("u1", "DGB-segwit", "KMD", 1000, dec("1"), dec("1")));
        index.set_event_windows(vec![window(900, 1100, "KMD", "DGB")]);
        assert_eq!(index.prune(10_000), 0);
        assert_eq!(index.total_count(), 1);
    }

    #[test]
    fn window_on_another_pair_does_not_protect() {
        let index = SwapIndex::new(60);
        index.upsert(swap("u1", "KMD", "DGB", 1000, dec("1"), dec("1")));
        index.set_event_windows(vec![window(900, 1100, "KMD", "LTC")]);
        assert_eq!(index.prune(10_000), 1);
        assert_eq!(index.pair_count(), 0);
    }

    #[test]
    fn cutoff_is_inclusive_and_prune_is_idempotent() {
        let index = SwapIndex::new(100);
        index.upsert(swap("edge", "KMD", "DGB", 900, dec("1"), dec("1")));
        index.upsert(swap("young", "KMD", "DGB", 901, dec("1"), dec("1")));
        assert_eq!(index.prune(1000), 1);
        assert!(index.get("edge").is_none());
        assert_eq!(index.prune(1000), 0);
        assert_eq!(index.total_count(), 1);
    }

    #[test]
    fn stale_bucket_entries_are_skipped() {
        let index = SwapIndex::new(3600);
        index.upsert(swap("u1", "KMD", "DGB", 100, dec("1"), dec("1")));
        index.upsert(swap("u2", "KMD", "DGB", 200, dec("1"), dec("1")));
        index.state.write().swaps.remove("u1");

        let rows = index.swaps_for_pair("KMD", "DGB", 0, 1000);
        assert_eq!(uuids(&rows), vec!["u2"]);
        assert_eq!(index.stats_for_pair("KMD", "DGB", 0, 1000).total_swaps, 1);
    }

    #[test]
    fn event_window_lookup() {
        let index = SwapIndex::new(3600);
        assert!(index.event_window("E").is_none());
        index.set_event_windows(vec![window(1, 2, "KMD", "DGB")]);
        assert_eq!(index.event_windows().len(), 1);
        assert!(index.event_window("E").is_some());
    }

    #[test]
    fn concurrent_ingest_and_prune_stay_consistent() {
        let index = Arc::new(SwapIndex::new(0));
        let writers: Vec<_> = (0..4)
            .map(|t| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || {
                    for i in 0..250_i64 {
                        let uuid = format!("t{t}-{i}");
                        index.upsert(swap(&uuid, "KMD", "DGB", 1000 + i, dec("1"), dec("1")));
                    }
                })
            })
            .collect();
        let pruner = {
            let index = Arc::clone(&index);
            std::thread::spawn(move || {
                let mut removed = 0;
                for _ in 0..50 {
                    removed += index.prune(1100);
                }
                removed
            })
        };
        for w in writers {
            assert!(w.join().is_ok());
        }
        let Ok(mut removed) = pruner.join() else {
            panic!("pruner panicked");
        };
        removed += index.prune(1100);

        // Everything at or before 1100 is gone, everything after survives.
        assert_eq!(removed, 4 * 101);
        assert_eq!(index.total_count(), 4 * 149);
        assert_eq!(index.swaps_for_pair("KMD", "DGB", 0, 5000).len(), 4 * 149);
    }
}
