//! Pubkey identification handler.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{IdentifyQuery, IdentifyResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, TrackerError};

/// `GET /identify` — Hash of the pubkey that traded `ticker` in a swap.
///
/// # Errors
///
/// Returns [`TrackerError::SwapNotFound`], [`TrackerError::TickerNotInSwap`]
/// or [`TrackerError::PubkeyNotFound`].
#[utoipa::path(
    get,
    path = "/api/v1/identify",
    tag = "Identity",
    summary = "Identify a swap participant",
    description = "Finds the leg of the swap trading `ticker` and returns the keyed hash of its pubkey.",
    params(IdentifyQuery),
    responses(
        (status = 200, description = "Pubkey hash", body = IdentifyResponse),
        (status = 400, description = "Ticker not part of swap", body = ErrorResponse),
        (status = 404, description = "Swap or pubkey not found", body = ErrorResponse),
    )
)]
pub async fn identify(
    State(state): State<AppState>,
    Query(q): Query<IdentifyQuery>,
) -> Result<impl IntoResponse, TrackerError> {
    let pubkey_hash = state.hasher.identify(state.index(), &q.uuid, &q.ticker)?;
    Ok(Json(IdentifyResponse { pubkey_hash }))
}

/// Identity routes (mounted under `/api/v1`).
pub fn routes() -> Router<AppState> {
    Router::new().route("/identify", get(identify))
}
