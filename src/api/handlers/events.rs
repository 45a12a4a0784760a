//! Event window handlers: list, overview, swaps and leaderboard.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    EventListResponse, EventOverviewDto, EventSwapsResponse, EventWindowDto, PaginationParams,
    SwapDto, TraderRowDto, TradersQuery, TradersResponse,
};
use crate::app_state::AppState;
use crate::domain::EventWindow;
use crate::error::{ErrorResponse, TrackerError};
use crate::service::{aggregate_trader_metrics, event_overview, event_swaps};

fn find_event(state: &AppState, name: &str) -> Result<EventWindow, TrackerError> {
    state
        .index()
        .event_window(name)
        .ok_or_else(|| TrackerError::EventNotFound(name.to_string()))
}

/// Resolves the leaderboard range: defaults to the window, clamped into it.
fn effective_range(
    event: &EventWindow,
    start: Option<i64>,
    stop: Option<i64>,
) -> Result<(i64, i64), TrackerError> {
    if let (Some(start), Some(stop)) = (start, stop) {
        if stop < start {
            return Err(TrackerError::InvalidTimeRange { start, stop });
        }
    }
    let start = start.unwrap_or(event.start).clamp(event.start, event.stop);
    let stop = stop.unwrap_or(event.stop).clamp(event.start, event.stop);
    if stop < start {
        return Err(TrackerError::InvalidTimeRange { start, stop });
    }
    Ok((start, stop))
}

/// `GET /events` — Registered event windows.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "List events",
    description = "Returns every event window loaded at startup.",
    responses(
        (status = 200, description = "Event windows", body = EventListResponse),
    )
)]
pub async fn list_events(State(state): State<AppState>) -> impl IntoResponse {
    let data = state
        .index()
        .event_windows()
        .into_iter()
        .map(EventWindowDto::from)
        .collect();
    Json(EventListResponse { data })
}

/// `GET /events/{name}` — Event overview.
///
/// # Errors
///
/// Returns [`TrackerError::EventNotFound`] for an unknown name.
#[utoipa::path(
    get,
    path = "/api/v1/events/{name}",
    tag = "Events",
    summary = "Event overview",
    description = "Trade count, distinct users, volumes and their current USD value inside the window.",
    params(
        ("name" = String, Path, description = "Event name"),
    ),
    responses(
        (status = 200, description = "Overview", body = EventOverviewDto),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, TrackerError> {
    let event = find_event(&state, &name)?;
    let overview = event_overview(state.index(), &event, state.prices.as_ref());
    Ok(Json(EventOverviewDto::from(overview)))
}

/// `GET /events/{name}/swaps` — Swaps inside the window.
///
/// # Errors
///
/// Returns [`TrackerError::EventNotFound`] for an unknown name.
#[utoipa::path(
    get,
    path = "/api/v1/events/{name}/swaps",
    tag = "Events",
    summary = "Event swaps",
    description = "Paginated swaps of the event pair in either direction, most recent first.",
    params(
        ("name" = String, Path, description = "Event name"),
        PaginationParams,
    ),
    responses(
        (status = 200, description = "Swaps page", body = EventSwapsResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event_swaps(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, TrackerError> {
    let event = find_event(&state, &name)?;
    let swaps = event_swaps(state.index(), &event);
    let (page, pagination) = params.paginate(swaps);
    Ok(Json(EventSwapsResponse {
        event: event.name,
        data: page.iter().map(|s| SwapDto::from(s.as_ref())).collect(),
        pagination,
    }))
}

/// `GET /events/{name}/traders` — Event leaderboard.
///
/// # Errors
///
/// Returns [`TrackerError::EventNotFound`] for an unknown name, or
/// [`TrackerError::InvalidTimeRange`] if `stop < start`.
#[utoipa::path(
    get,
    path = "/api/v1/events/{name}/traders",
    tag = "Events",
    summary = "Event leaderboard",
    description = "Per-trader volumes and USD values ranked by USD total. Both participants of a swap are credited. `search` filters by pubkey substring without renumbering ranks.",
    params(
        ("name" = String, Path, description = "Event name"),
        TradersQuery,
    ),
    responses(
        (status = 200, description = "Leaderboard", body = TradersResponse),
        (status = 400, description = "Invalid range", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event_traders(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(q): Query<TradersQuery>,
) -> Result<impl IntoResponse, TrackerError> {
    let event = find_event(&state, &name)?;
    let (start, stop) = effective_range(&event, q.start, q.stop)?;
    let rows = aggregate_trader_metrics(
        state.index(),
        &event,
        start,
        stop,
        state.prices.as_ref(),
        q.search.as_deref(),
    );
    let data = rows
        .into_iter()
        .map(|row| TraderRowDto::from_row(row, &state.hasher))
        .collect();
    Ok(Json(TradersResponse {
        event: event.name,
        start,
        stop,
        data,
    }))
}

/// Event routes (mounted under `/api/v1`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/{name}", get(get_event))
        .route("/events/{name}/swaps", get(get_event_swaps))
        .route("/events/{name}/traders", get(get_event_traders))
}
