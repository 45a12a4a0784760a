//! Coin symbol canonicalization and directional pair keys.
//!
//! The trading daemon records raw coin symbols that may carry a platform
//! suffix (`"DGB-segwit"`, `"USDC-ERC20"`) next to an optional canonical
//! ticker. Every place that matches coins against each other goes through
//! [`canonical_symbol`] so that both spellings resolve to the same coin.

use std::fmt;

/// Returns the canonical trading symbol for one swap leg.
///
/// The ticker wins when present and non-blank; otherwise the raw symbol is
/// cut at the first `-`. The result is always uppercase.
#[must_use]
pub fn canonical_symbol(raw: &str, ticker: Option<&str>) -> String {
    if let Some(ticker) = ticker.map(str::trim).filter(|t| !t.is_empty()) {
        return ticker.to_uppercase();
    }
    let base = raw.split('-').next().unwrap_or(raw);
    base.trim().to_uppercase()
}

/// Canonicalizes a user-supplied coin (query parameter, config entry).
#[must_use]
pub fn normalize_coin(coin: &str) -> String {
    canonical_symbol(coin, None)
}

/// Directional bucket key of the secondary index: `MAKER|TAKER`.
///
/// `KMD|DGB` and `DGB|KMD` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    maker: String,
    taker: String,
}

impl PairKey {
    /// Builds a key from two coins, canonicalizing both.
    #[must_use]
    pub fn new(maker: &str, taker: &str) -> Self {
        Self {
            maker: normalize_coin(maker),
            taker: normalize_coin(taker),
        }
    }

    /// Builds a key from symbols that are already canonical.
    #[must_use]
    pub(crate) fn from_canonical(maker: String, taker: String) -> Self {
        Self { maker, taker }
    }

    /// Returns the same two coins with the roles swapped.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            maker: self.taker.clone(),
            taker: self.maker.clone(),
        }
    }

    /// Maker-side canonical symbol.
    #[must_use]
    pub fn maker(&self) -> &str {
        &self.maker
    }

    /// Taker-side canonical symbol.
    #[must_use]
    pub fn taker(&self) -> &str {
        &self.taker
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.maker, self.taker)
    }
}
