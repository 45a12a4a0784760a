//! Read-only price lookup seam used by the aggregation engine.

use std::collections::HashMap;
use std::fmt::Debug;

use crate::domain::normalize_coin;

/// Source of current USD prices keyed by canonical coin symbol.
///
/// Implementations must not block: they return whatever is cached, and
/// `None` is a normal answer while prices are still warming up.
pub trait PriceProvider: Send + Sync + Debug {
    /// Current USD price of `symbol`, if known.
    fn price_usd(&self, symbol: &str) -> Option<f64>;
}

/// Fixed price table.
///
/// An empty table is the "no prices" provider.
#[derive(Debug, Clone, Default)]
pub struct StaticPrices {
    prices: HashMap<String, f64>,
}

impl StaticPrices {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one price.
    #[must_use]
    pub fn with_price(mut self, symbol: &str, usd: f64) -> Self {
        self.prices.insert(normalize_coin(symbol), usd);
        self
    }
}

impl PriceProvider for StaticPrices {
    fn price_usd(&self, symbol: &str) -> Option<f64> {
        self.prices.get(&normalize_coin(symbol)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_canonical() {
        let prices = StaticPrices::new().with_price("kmd", 0.25);
        assert_eq!(prices.price_usd("KMD"), Some(0.25));
        assert_eq!(prices.price_usd("kmd-segwit"), Some(0.25));
        assert_eq!(prices.price_usd("DGB"), None);
    }
}
