//! # swap-tracker
//!
//! In-memory index and statistics service for completed atomic swaps.
//!
//! A monitor polls the trading daemon's SQLite database and feeds every
//! finished swap into a [`domain::SwapIndex`]: a primary map by uuid plus
//! per-pair buckets sorted by completion time. Swaps older than the
//! retention horizon are evicted unless an event window protects them.
//! Dashboards query pair statistics, event overviews and trader
//! leaderboards over REST, and follow the running total over WebSocket.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── TrackerService + aggregations (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── SwapIndex (domain/)      ◄── PriceCache (prices/)
//!     │
//!     └── SwapMonitor (source/)    ◄── daemon SQLite (stats_swaps)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod identity;
pub mod prices;
pub mod service;
pub mod source;
pub mod ws;
