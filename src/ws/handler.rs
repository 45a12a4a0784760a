//! Axum WebSocket upgrade handler.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;

/// `GET /ws/total` — Upgrade to the running total feed.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let event_rx = state.event_bus().subscribe();
    let tracker = state.tracker.clone();

    ws.on_upgrade(move |socket| run_connection(socket, event_rx, tracker))
}
