//! Background-refreshed USD price cache.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::watch;

use super::coin_config::CoinConfig;
use super::provider::PriceProvider;
use crate::domain::normalize_coin;

#[derive(Debug, Default)]
struct CacheState {
    prices: HashMap<String, f64>,
    wanted: HashSet<String>,
}

/// USD prices fetched from CoinGecko on a fixed cadence.
///
/// Reads never touch the network. Asking for a symbol that is not tracked
/// yet registers it, so it is fetched on the next refresh.
#[derive(Debug)]
pub struct PriceCache {
    coins: CoinConfig,
    api_url: String,
    client: reqwest::Client,
    state: RwLock<CacheState>,
}

impl PriceCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(coins: CoinConfig, api_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            coins,
            api_url: api_url.into(),
            client,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Marks symbols to be fetched on the next refresh.
    pub fn register_symbols<'a>(&self, symbols: impl IntoIterator<Item = &'a str>) {
        let mut state = self.state.write();
        for symbol in symbols {
            state.wanted.insert(normalize_coin(symbol));
        }
    }

    /// Stores a price directly.
    pub fn set_price(&self, symbol: &str, usd: f64) {
        self.state.write().prices.insert(normalize_coin(symbol), usd);
    }

    /// Fetches prices for every wanted symbol that has a CoinGecko id.
    ///
    /// Returns the number of prices updated.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`reqwest::Error`] if the request fails or
    /// the response is not JSON.
    pub async fn refresh_once(&self) -> Result<usize, reqwest::Error> {
        let wanted: Vec<String> = {
            let state = self.state.read();
            let mut symbols: Vec<String> = state.wanted.iter().cloned().collect();
            symbols.sort();
            symbols
        };

        let ids: BTreeMap<String, String> = wanted
            .into_iter()
            .filter_map(|symbol| {
                let id = self.coins.coingecko_id(&symbol)?.to_string();
                Some((symbol, id))
            })
            .collect();
        if ids.is_empty() {
            return Ok(0);
        }

        let mut query_ids: Vec<&str> = ids.values().map(String::as_str).collect();
        query_ids.sort_unstable();
        query_ids.dedup();

        let doc: Value = self
            .client
            .get(&self.api_url)
            .query(&[("ids", query_ids.join(",")), ("vs_currencies", "usd".to_string())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let fresh = extract_prices(&doc, &ids);
        let updated = fresh.len();
        self.state.write().prices.extend(fresh);
        Ok(updated)
    }

    /// Refreshes every `interval` until `shutdown` flips.
    ///
    /// A refresh still in flight when `shutdown` flips is abandoned.
    pub async fn run(self: Arc<Self>, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }
            tokio::select! {
                result = self.refresh_once() => match result {
                    Ok(updated) => tracing::debug!(updated, "price cache refreshed"),
                    Err(e) => tracing::warn!(error = %e, "price refresh failed"),
                },
                _ = shutdown.changed() => break,
            }
        }
        tracing::debug!("price refresher stopped");
    }
}

impl PriceProvider for PriceCache {
    fn price_usd(&self, symbol: &str) -> Option<f64> {
        let symbol = normalize_coin(symbol);
        {
            let state = self.state.read();
            if state.wanted.contains(&symbol) {
                return state.prices.get(&symbol).copied();
            }
        }
        let mut state = self.state.write();
        let price = state.prices.get(&symbol).copied();
        state.wanted.insert(symbol);
        price
    }
}

/// Maps `{ "<id>": { "usd": <number> } }` back onto symbols.
fn extract_prices(doc: &Value, ids: &BTreeMap<String, String>) -> Vec<(String, f64)> {
    ids.iter()
        .filter_map(|(symbol, id)| {
            let usd = doc.get(id)?.get("usd")?.as_f64()?;
            Some((symbol.clone(), usd))
        })
        .collect()
}
