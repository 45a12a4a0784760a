//! REST endpoint handlers organized by resource.

pub mod events;
pub mod identify;
pub mod stats;
pub mod swap;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(swap::routes())
        .merge(stats::routes())
        .merge(events::routes())
        .merge(identify::routes())
}
