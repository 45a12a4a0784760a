//! Upstream swap source: the trading daemon's SQLite database.
//!
//! [`SqliteSwapSource`] reads `stats_swaps` rows into [`crate::domain::SwapRecord`]s.
//! [`SwapMonitor`] polls it and hands new rows to the
//! [`crate::service::TrackerService`].

pub mod monitor;
pub mod sqlite;

pub use monitor::{SwapMonitor, startup_ranges};
pub use sqlite::{SqliteSwapSource, SwapBatch};
