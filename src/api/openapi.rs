//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use crate::api::dto::{
    EventListResponse, EventOverviewDto, EventSwapsResponse, EventWindowDto, IdentifyResponse,
    PaginationMeta, PairStatsResponse, SwapDto, TotalResponse, TraderRowDto, TradersResponse,
};
use crate::api::handlers::{events, identify, stats, swap, system};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI specification, served at `/api-docs/openapi.json`.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "swap-tracker",
        description = "In-memory index and statistics for completed atomic swaps."
    ),
    paths(
        system::health_handler,
        swap::total_swaps,
        swap::get_swap,
        stats::pair_stats,
        events::list_events,
        events::get_event,
        events::get_event_swaps,
        events::get_event_traders,
        identify::identify,
    ),
    components(schemas(
        system::HealthResponse,
        TotalResponse,
        SwapDto,
        PairStatsResponse,
        EventWindowDto,
        EventListResponse,
        EventOverviewDto,
        EventSwapsResponse,
        PaginationMeta,
        TraderRowDto,
        TradersResponse,
        IdentifyResponse,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "System", description = "Service health"),
        (name = "Swaps", description = "Indexed swaps"),
        (name = "Stats", description = "Pair statistics"),
        (name = "Events", description = "Event windows and leaderboards"),
        (name = "Identity", description = "Participant identification"),
    )
)]
pub struct ApiDoc;
