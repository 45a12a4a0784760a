//! Swap record DTOs.

use bigdecimal::BigDecimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::SwapRecord;

/// One completed swap as returned by the API.
///
/// Amounts and prices are decimal strings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SwapDto {
    /// Source row id.
    pub id: i64,
    /// Swap identifier.
    pub uuid: String,
    /// Raw maker coin.
    pub maker_coin: String,
    /// Raw taker coin.
    pub taker_coin: String,
    /// Canonical maker coin.
    pub maker_symbol: String,
    /// Canonical taker coin.
    pub taker_symbol: String,
    /// Maker ticker, if recorded.
    pub maker_coin_ticker: Option<String>,
    /// Maker platform, if recorded.
    pub maker_coin_platform: Option<String>,
    /// Taker ticker, if recorded.
    pub taker_coin_ticker: Option<String>,
    /// Taker platform, if recorded.
    pub taker_coin_platform: Option<String>,
    /// Start time, unix seconds.
    pub started_at: Option<i64>,
    /// Completion time, unix seconds.
    pub finished_at: Option<i64>,
    /// Maker amount.
    pub maker_amount: String,
    /// Taker amount.
    pub taker_amount: String,
    /// Maker USD price at execution.
    pub maker_coin_usd_price: Option<String>,
    /// Taker USD price at execution.
    pub taker_coin_usd_price: Option<String>,
    /// Outcome flag.
    pub is_success: Option<bool>,
    /// Maker pubkey.
    pub maker_pubkey: Option<String>,
    /// Taker pubkey.
    pub taker_pubkey: Option<String>,
    /// Maker GUI.
    pub maker_gui: Option<String>,
    /// Taker GUI.
    pub taker_gui: Option<String>,
    /// Maker daemon version.
    pub maker_version: Option<String>,
    /// Taker daemon version.
    pub taker_version: Option<String>,
}

impl From<&SwapRecord> for SwapDto {
    fn from(s: &SwapRecord) -> Self {
        Self {
            id: s.id,
            uuid: s.uuid.clone(),
            maker_coin: s.maker_coin.clone(),
            taker_coin: s.taker_coin.clone(),
            maker_symbol: s.maker_symbol(),
            taker_symbol: s.taker_symbol(),
            maker_coin_ticker: s.maker_coin_ticker.clone(),
            maker_coin_platform: s.maker_coin_platform.clone(),
            taker_coin_ticker: s.taker_coin_ticker.clone(),
            taker_coin_platform: s.taker_coin_platform.clone(),
            started_at: s.started_at,
            finished_at: s.finished_at,
            maker_amount: s.maker_amount.to_plain_string(),
            taker_amount: s.taker_amount.to_plain_string(),
            maker_coin_usd_price: s.maker_coin_usd_price.as_ref().map(BigDecimal::to_plain_string),
            taker_coin_usd_price: s.taker_coin_usd_price.as_ref().map(BigDecimal::to_plain_string),
            is_success: s.is_success,
            maker_pubkey: s.maker_pubkey.clone(),
            taker_pubkey: s.taker_pubkey.clone(),
            maker_gui: s.maker_gui.clone(),
            taker_gui: s.taker_gui.clone(),
            maker_version: s.maker_version.clone(),
            taker_version: s.taker_version.clone(),
        }
    }
}
