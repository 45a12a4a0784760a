//! Polling producer that feeds the tracker from the daemon database.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::watch;

use super::sqlite::SqliteSwapSource;
use crate::domain::EventWindow;
use crate::error::TrackerError;
use crate::service::TrackerService;

/// Interval between checks while the database file does not exist yet.
const WAIT_FOR_FILE: Duration = Duration::from_secs(1);

/// Polls `stats_swaps` for new rows and ingests them.
#[derive(Debug, Clone)]
pub struct SwapMonitor {
    db_path: PathBuf,
    service: TrackerService,
    poll_interval: Duration,
    load_history: bool,
}

impl SwapMonitor {
    /// Creates a monitor for the database at `db_path`.
    #[must_use]
    pub fn new(
        db_path: PathBuf,
        service: TrackerService,
        poll_interval: Duration,
        load_history: bool,
    ) -> Self {
        Self {
            db_path,
            service,
            poll_interval,
            load_history,
        }
    }

    /// Ingests every row finished inside each `[start, stop]` range.
    ///
    /// Returns the number of newly indexed swaps. A missing database file
    /// is not an error and backfills nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Source`] if the database cannot be read.
    pub async fn backfill(&self, ranges: &[(i64, i64)]) -> Result<usize, TrackerError> {
        if ranges.is_empty() || !self.db_path.exists() {
            return Ok(0);
        }
        let source = SqliteSwapSource::connect(&self.db_path).await?;
        let mut added = 0_usize;
        for &(start, stop) in ranges {
            let batch = match source.fetch_finished_between(start, stop).await {
                Ok(batch) => batch,
                Err(e) => {
                    source.close().await;
                    return Err(e);
                }
            };
            for record in batch.records {
                if self.service.ingest(record) {
                    added += 1;
                }
            }
        }
        source.close().await;
        tracing::info!(added, ranges = ranges.len(), "startup backfill complete");
        Ok(added)
    }

    /// Polls until `shutdown` flips to `true`.
    ///
    /// Waits for the database file, places the cursor (all history or the
    /// current max id), then ingests new rows every poll interval. Source
    /// errors drop the connection; the next tick reconnects. The cursor
    /// survives reconnects.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        while !self.db_path.exists() {
            tracing::debug!(path = %self.db_path.display(), "waiting for swap database");
            tokio::select! {
                () = tokio::time::sleep(WAIT_FOR_FILE) => {}
                _ = shutdown.changed() => return,
            }
        }

        tracing::info!(
            path = %self.db_path.display(),
            load_history = self.load_history,
            "swap monitor started"
        );

        let mut source: Option<SqliteSwapSource> = None;
        let mut cursor: Option<i64> = None;
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }

            if source.is_none() {
                match SqliteSwapSource::connect(&self.db_path).await {
                    Ok(s) => source = Some(s),
                    Err(e) => {
                        tracing::warn!(error = %e, "swap database connect failed");
                        continue;
                    }
                }
            }
            let Some(src) = source.as_ref() else {
                continue;
            };

            match self.poll_once(src, &mut cursor).await {
                Ok(added) if added > 0 => tracing::debug!(added, cursor = ?cursor, "polled swaps"),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "swap poll failed, reconnecting");
                    src.close().await;
                    source = None;
                }
            }
        }

        if let Some(src) = source {
            src.close().await;
        }
        tracing::info!("swap monitor stopped");
    }

    async fn poll_once(
        &self,
        source: &SqliteSwapSource,
        cursor: &mut Option<i64>,
    ) -> Result<usize, TrackerError> {
        let last_id = match *cursor {
            Some(id) => id,
            None => {
                let id = if self.load_history {
                    -1
                } else {
                    source.max_id().await?
                };
                *cursor = Some(id);
                id
            }
        };

        let batch = source.fetch_after(last_id).await?;
        let mut added = 0_usize;
        for record in batch.records {
            if self.service.ingest(record) {
                added += 1;
            }
        }
        if let Some(id) = batch.last_id {
            *cursor = Some(id);
        }
        Ok(added)
    }
}

/// Time ranges to backfill at startup.
///
/// `since` adds `[since, now]`; every event window adds its own range so
/// protected swaps are present even without history loading.
#[must_use]
pub fn startup_ranges(since: Option<i64>, now: i64, windows: &[EventWindow]) -> Vec<(i64, i64)> {
    let mut ranges: Vec<(i64, i64)> = since
        .filter(|&s| s <= now)
        .map(|s| (s, now))
        .into_iter()
        .collect();
    ranges.extend(windows.iter().map(|w| (w.start, w.stop)));
    ranges
}
