//! WebSocket connection loop for the running total feed.
//!
//! Sends the current total on connect, then one frame per index change
//! carried by the event bus. Client frames are ignored apart from close.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::TotalMessage;
use crate::domain::IndexEvent;
use crate::service::TrackerService;

/// Runs the read/write loop for a single WebSocket connection.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<IndexEvent>,
    tracker: TrackerService,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let mut last_sent = tracker.index().total_count();
    let hello = TotalMessage { total: last_sent };
    if ws_tx.send(Message::text(hello.to_json())).await.is_err() {
        return;
    }

    loop {
        let total = tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    _ => continue,
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(event) => event.total(),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                        tracker.index().total_count()
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        };

        if total == last_sent {
            continue;
        }
        last_sent = total;
        if ws_tx
            .send(Message::text(TotalMessage { total }.to_json()))
            .await
            .is_err()
        {
            break;
        }
    }

    tracing::debug!("ws connection closed");
}
