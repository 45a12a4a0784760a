//! Periodic retention sweeps.

use std::time::Duration;

use tokio::sync::watch;

use super::TrackerService;

/// Prunes the index every `interval` until `shutdown` flips to `true`.
///
/// The first sweep runs after one full interval.
pub async fn run_retention_loop(
    service: TrackerService,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let start = tokio::time::Instant::now() + interval;
    let mut ticker = tokio::time::interval_at(start, interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    tracing::info!(interval_secs = interval.as_secs(), "retention loop started");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = service.prune_now();
                tracing::debug!(removed, total = service.index().total_count(), "retention sweep");
            }
            _ = shutdown.changed() => break,
        }
    }
    tracing::info!("retention loop stopped");
}
