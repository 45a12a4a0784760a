//! Service layer: mutation orchestration and read-side aggregations.
//!
//! [`TrackerService`] feeds the [`super::domain::SwapIndex`] and emits
//! events through the [`super::domain::EventBus`]. The [`aggregation`]
//! functions answer the dashboard queries from the index alone.

pub mod aggregation;
pub mod retention;
pub mod tracker_service;

pub use aggregation::{
    EventOverview, TraderRow, aggregate_trader_metrics, event_overview, event_swaps,
};
pub use retention::run_retention_loop;
pub use tracker_service::TrackerService;
