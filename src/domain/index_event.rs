//! Events emitted after the swap index changes.
//!
//! Every successful ingest or non-empty prune publishes an [`IndexEvent`]
//! through the [`super::EventBus`]. WebSocket clients use them to follow
//! the running swap total without polling.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Domain event emitted after an index mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum IndexEvent {
    /// A new swap was indexed.
    SwapIngested {
        /// Swap identifier.
        uuid: String,
        /// Canonical `MAKER|TAKER` key of the swap.
        pair: String,
        /// Completion time, unix seconds.
        finished_at: i64,
        /// Index size after the insert.
        total: usize,
        /// When the swap was indexed.
        timestamp: DateTime<Utc>,
    },

    /// A retention sweep removed swaps.
    SwapsPruned {
        /// Number of swaps evicted.
        removed: usize,
        /// Index size after the sweep.
        total: usize,
        /// When the sweep ran.
        timestamp: DateTime<Utc>,
    },
}

impl IndexEvent {
    /// Index size right after the mutation.
    #[must_use]
    pub const fn total(&self) -> usize {
        match self {
            Self::SwapIngested { total, .. } | Self::SwapsPruned { total, .. } => *total,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::SwapIngested { .. } => "swap_ingested",
            Self::SwapsPruned { .. } => "swaps_pruned",
        }
    }
}
