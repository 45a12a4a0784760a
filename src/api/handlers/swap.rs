//! Swap lookup handlers: running total and single swap.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{SwapDto, TotalResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, TrackerError};

/// `GET /swaps/total` — Number of indexed swaps.
#[utoipa::path(
    get,
    path = "/api/v1/swaps/total",
    tag = "Swaps",
    summary = "Indexed swap count",
    description = "Returns the number of completed swaps currently held in memory.",
    responses(
        (status = 200, description = "Current total", body = TotalResponse),
    )
)]
pub async fn total_swaps(State(state): State<AppState>) -> impl IntoResponse {
    Json(TotalResponse {
        total: state.index().total_count(),
    })
}

/// `GET /swaps/{uuid}` — Single swap by uuid.
///
/// # Errors
///
/// Returns [`TrackerError::SwapNotFound`] if the uuid is not indexed.
#[utoipa::path(
    get,
    path = "/api/v1/swaps/{uuid}",
    tag = "Swaps",
    summary = "Get a swap",
    description = "Returns one indexed swap. Swaps evicted by retention are no longer found.",
    params(
        ("uuid" = String, Path, description = "Swap uuid"),
    ),
    responses(
        (status = 200, description = "Swap record", body = SwapDto),
        (status = 404, description = "Swap not found", body = ErrorResponse),
    )
)]
pub async fn get_swap(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<impl IntoResponse, TrackerError> {
    let swap = state
        .index()
        .get(&uuid)
        .ok_or(TrackerError::SwapNotFound(uuid))?;
    Ok(Json(SwapDto::from(swap.as_ref())))
}

/// Swap routes (mounted under `/api/v1`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/swaps/total", get(total_swaps))
        .route("/swaps/{uuid}", get(get_swap))
}
