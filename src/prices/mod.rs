//! USD price lookup.
//!
//! Aggregations read prices through the [`PriceProvider`] trait. The
//! production implementation is [`PriceCache`], refreshed in the
//! background from CoinGecko; [`StaticPrices`] serves fixed values.

use std::time::Duration;

pub mod coin_config;
pub mod price_cache;
pub mod provider;

pub use coin_config::CoinConfig;
pub use price_cache::PriceCache;
pub use provider::{PriceProvider, StaticPrices};

/// HTTP client for the coins config and price endpoints.
///
/// Connecting and every whole request are bounded by `timeout`.
///
/// # Errors
///
/// Returns [`reqwest::Error`] if the TLS backend cannot be initialised.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
}
