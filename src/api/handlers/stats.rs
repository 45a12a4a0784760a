//! Pair statistics handler.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{PairStatsQuery, PairStatsResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, TrackerError};

/// `GET /stats/pair` — Directional totals for one pair.
///
/// # Errors
///
/// Returns [`TrackerError::InvalidTimeRange`] if `end_ts < start_ts`.
#[utoipa::path(
    get,
    path = "/api/v1/stats/pair",
    tag = "Stats",
    summary = "Pair statistics",
    description = "Counts swaps and sums amounts for `maker_coin -> taker_coin` in `[start_ts, end_ts]`. The reverse direction is not included.",
    params(PairStatsQuery),
    responses(
        (status = 200, description = "Pair totals", body = PairStatsResponse),
        (status = 400, description = "Invalid range", body = ErrorResponse),
    )
)]
pub async fn pair_stats(
    State(state): State<AppState>,
    Query(q): Query<PairStatsQuery>,
) -> Result<impl IntoResponse, TrackerError> {
    if q.end_ts < q.start_ts {
        return Err(TrackerError::InvalidTimeRange {
            start: q.start_ts,
            stop: q.end_ts,
        });
    }
    let stats = state
        .index()
        .stats_for_pair(&q.maker_coin, &q.taker_coin, q.start_ts, q.end_ts);
    Ok(Json(PairStatsResponse::from(stats)))
}

/// Stats routes (mounted under `/api/v1`).
pub fn routes() -> Router<AppState> {
    Router::new().route("/stats/pair", get(pair_stats))
}
