//! Event window, overview and leaderboard DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::PaginationMeta;
use super::swap_dto::SwapDto;
use crate::domain::EventWindow;
use crate::identity::PubkeyHasher;
use crate::service::{EventOverview, TraderRow};

/// A registered event window.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventWindowDto {
    /// Event name.
    pub name: String,
    /// Inclusive start, unix seconds.
    pub start: i64,
    /// Inclusive stop, unix seconds.
    pub stop: i64,
    /// Base coin.
    pub base_coin: String,
    /// Rel coin.
    pub rel_coin: String,
    /// Opaque metadata from the events file.
    #[schema(value_type = Object)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl From<EventWindow> for EventWindowDto {
    fn from(w: EventWindow) -> Self {
        Self {
            name: w.name,
            start: w.start,
            stop: w.stop,
            base_coin: w.base_coin,
            rel_coin: w.rel_coin,
            extra: w.extra,
        }
    }
}

/// Response body for `GET /events`.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventListResponse {
    /// All registered windows.
    pub data: Vec<EventWindowDto>,
}

/// Response body for `GET /events/{name}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventOverviewDto {
    /// Event name.
    pub name: String,
    /// Window start.
    pub start: i64,
    /// Window stop.
    pub stop: i64,
    /// Base coin.
    pub base_coin: String,
    /// Rel coin.
    pub rel_coin: String,
    /// Swaps in the window.
    pub trade_count: usize,
    /// Distinct participants.
    pub user_count: usize,
    /// Base coin volume.
    pub base_volume: String,
    /// Rel coin volume.
    pub rel_volume: String,
    /// Live base coin price.
    pub base_price_usd: Option<f64>,
    /// Live rel coin price.
    pub rel_price_usd: Option<f64>,
    /// Base volume in USD.
    pub usd_base_value: f64,
    /// Rel volume in USD.
    pub usd_rel_value: f64,
    /// Combined USD volume.
    pub usd_total_value: f64,
}

impl From<EventOverview> for EventOverviewDto {
    fn from(o: EventOverview) -> Self {
        Self {
            name: o.name,
            start: o.start,
            stop: o.stop,
            base_coin: o.base_coin,
            rel_coin: o.rel_coin,
            trade_count: o.trade_count,
            user_count: o.user_count,
            base_volume: o.base_volume.to_plain_string(),
            rel_volume: o.rel_volume.to_plain_string(),
            base_price_usd: o.base_price_usd,
            rel_price_usd: o.rel_price_usd,
            usd_base_value: o.usd_base_value,
            usd_rel_value: o.usd_rel_value,
            usd_total_value: o.usd_total_value,
        }
    }
}

/// Response body for `GET /events/{name}/swaps`.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventSwapsResponse {
    /// Event name.
    pub event: String,
    /// Swaps on this page, most recent first.
    pub data: Vec<SwapDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Query for `GET /events/{name}/traders`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TradersQuery {
    /// Case-insensitive pubkey substring.
    #[serde(default)]
    pub search: Option<String>,
    /// Range start; defaults to the window start.
    #[serde(default)]
    pub start: Option<i64>,
    /// Range stop; defaults to the window stop.
    #[serde(default)]
    pub stop: Option<i64>,
}

/// One leaderboard row.
#[derive(Debug, Serialize, ToSchema)]
pub struct TraderRowDto {
    /// Rank among all traders of the event.
    pub rank: usize,
    /// Trader pubkey.
    pub pubkey: String,
    /// Keyed hash of the pubkey.
    pub pubkey_hash: String,
    /// Base coin volume.
    pub base_volume: String,
    /// Rel coin volume.
    pub rel_volume: String,
    /// Base volume in USD.
    pub usd_base_value: f64,
    /// Rel volume in USD.
    pub usd_rel_value: f64,
    /// Ranking key.
    pub usd_total_value: f64,
    /// Average base coin price.
    pub base_price_usd: Option<f64>,
    /// Average rel coin price.
    pub rel_price_usd: Option<f64>,
    /// Swaps as maker.
    pub trades_as_maker: u64,
    /// Swaps as taker.
    pub trades_as_taker: u64,
    /// All swaps.
    pub trades_total: u64,
    /// Latest completion time.
    pub last_trade_at: i64,
}

impl TraderRowDto {
    /// Converts a row, hashing its pubkey.
    #[must_use]
    pub fn from_row(row: TraderRow, hasher: &PubkeyHasher) -> Self {
        Self {
            rank: row.rank,
            pubkey_hash: hasher.hash(&row.pubkey),
            pubkey: row.pubkey,
            base_volume: row.base_volume.to_plain_string(),
            rel_volume: row.rel_volume.to_plain_string(),
            usd_base_value: row.usd_base_value,
            usd_rel_value: row.usd_rel_value,
            usd_total_value: row.usd_total_value,
            base_price_usd: row.base_price_usd,
            rel_price_usd: row.rel_price_usd,
            trades_as_maker: row.trades_as_maker,
            trades_as_taker: row.trades_as_taker,
            trades_total: row.trades_total,
            last_trade_at: row.last_trade_at,
        }
    }
}

/// Response body for `GET /events/{name}/traders`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TradersResponse {
    /// Event name.
    pub event: String,
    /// Effective range start.
    pub start: i64,
    /// Effective range stop.
    pub stop: i64,
    /// Rows in rank order.
    pub data: Vec<TraderRowDto>,
}
