//! Coin symbol → CoinGecko id mapping.
//!
//! Built from the coins configuration published alongside the trading
//! daemon. Each top-level key is a coin symbol; its `coingecko_id` (or
//! legacy `coingecko`) field names the price feed.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

/// Symbol → CoinGecko id lookup table.
#[derive(Debug, Clone, Default)]
pub struct CoinConfig {
    symbol_to_id: HashMap<String, String>,
}

impl CoinConfig {
    /// Builds the table from a parsed coins configuration document.
    #[must_use]
    pub fn from_json(doc: &Value) -> Self {
        let symbol_to_id = doc
            .as_object()
            .map(|coins| {
                coins
                    .iter()
                    .filter_map(|(symbol, cfg)| {
                        let id = cfg
                            .get("coingecko_id")
                            .or_else(|| cfg.get("coingecko"))
                            .and_then(Value::as_str)
                            .filter(|id| !id.trim().is_empty())?;
                        Some((symbol.to_uppercase(), id.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { symbol_to_id }
    }

    /// Loads the local file if it exists, else fetches `url`.
    ///
    /// Never fails: on any error the table is empty and prices stay
    /// unknown.
    pub async fn load(path: Option<&Path>, url: &str, client: &reqwest::Client) -> Self {
        if let Some(path) = path.filter(|p| p.exists()) {
            match tokio::fs::read_to_string(path).await {
                Ok(raw) => match serde_json::from_str::<Value>(&raw) {
                    Ok(doc) => return Self::from_json(&doc),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "invalid coins config");
                    }
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "cannot read coins config");
                }
            }
        }

        let fetched = async {
            client
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .json::<Value>()
                .await
        }
        .await;
        match fetched {
            Ok(doc) => {
                let config = Self::from_json(&doc);
                tracing::info!(coins = config.len(), "loaded coins config");
                config
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "coins config unavailable, prices disabled");
                Self::default()
            }
        }
    }

    /// CoinGecko id for `symbol`, if configured.
    #[must_use]
    pub fn coingecko_id(&self, symbol: &str) -> Option<&str> {
        self.symbol_to_id
            .get(&symbol.to_uppercase())
            .map(String::as_str)
    }

    /// Number of coins with a price feed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbol_to_id.len()
    }

    /// Returns `true` if no coin has a price feed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbol_to_id.is_empty()
    }
}
