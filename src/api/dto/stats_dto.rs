//! Pair statistics DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::PairStats;

/// Query for `GET /stats/pair`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PairStatsQuery {
    /// Maker coin symbol.
    pub maker_coin: String,
    /// Taker coin symbol.
    pub taker_coin: String,
    /// Inclusive start, unix seconds.
    pub start_ts: i64,
    /// Inclusive end, unix seconds.
    pub end_ts: i64,
}

/// Directional pair totals.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PairStatsResponse {
    /// Canonical maker coin.
    pub maker_coin: String,
    /// Canonical taker coin.
    pub taker_coin: String,
    /// Range start.
    pub start_ts: i64,
    /// Range end.
    pub end_ts: i64,
    /// Swaps in range.
    pub total_swaps: usize,
    /// Sum of maker amounts.
    pub maker_amount_sum: f64,
    /// Sum of taker amounts.
    pub taker_amount_sum: f64,
}

impl From<PairStats> for PairStatsResponse {
    fn from(s: PairStats) -> Self {
        Self {
            maker_coin: s.maker_coin,
            taker_coin: s.taker_coin,
            start_ts: s.start,
            end_ts: s.stop,
            total_swaps: s.total_swaps,
            maker_amount_sum: s.maker_amount_sum,
            taker_amount_sum: s.taker_amount_sum,
        }
    }
}
