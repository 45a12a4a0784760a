//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::{EventBus, SwapIndex};
use crate::identity::PubkeyHasher;
use crate::prices::PriceProvider;
use crate::service::TrackerService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Tracker service owning the swap index and its event bus.
    pub tracker: TrackerService,
    /// USD price source for aggregations.
    pub prices: Arc<dyn PriceProvider>,
    /// Pubkey hasher for identify and leaderboard rows.
    pub hasher: PubkeyHasher,
}

impl AppState {
    /// Builds the state around `tracker`.
    #[must_use]
    pub fn new(tracker: TrackerService, prices: Arc<dyn PriceProvider>, hasher: PubkeyHasher) -> Self {
        Self {
            tracker,
            prices,
            hasher,
        }
    }

    /// Shortcut to the swap index.
    #[must_use]
    pub fn index(&self) -> &SwapIndex {
        self.tracker.index()
    }

    /// The tracker's event bus, for WebSocket subscriptions.
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        self.tracker.event_bus()
    }
}
