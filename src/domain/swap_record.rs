//! Normalized record of one completed swap.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize, Serializer};

use super::symbol::{PairKey, canonical_symbol};

/// Role a participant played in a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapRole {
    /// Party that placed the order.
    Maker,
    /// Party that matched the order.
    Taker,
}

/// One completed swap as reported by the trading daemon.
///
/// `uuid` is the identity key; `id` is the source row id and purely
/// informational. Amounts are kept as [`BigDecimal`] in base units, at the
/// precision the daemon wrote them, and are serialized as plain strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapRecord {
    /// Source row id.
    pub id: i64,
    /// Globally unique swap identifier.
    pub uuid: String,

    /// Raw maker coin symbol, possibly with a platform suffix.
    pub maker_coin: String,
    /// Raw taker coin symbol, possibly with a platform suffix.
    pub taker_coin: String,
    /// Canonical maker ticker, if the daemon reported one.
    #[serde(default)]
    pub maker_coin_ticker: Option<String>,
    /// Maker coin platform (passthrough).
    #[serde(default)]
    pub maker_coin_platform: Option<String>,
    /// Canonical taker ticker, if the daemon reported one.
    #[serde(default)]
    pub taker_coin_ticker: Option<String>,
    /// Taker coin platform (passthrough).
    #[serde(default)]
    pub taker_coin_platform: Option<String>,

    /// Unix seconds when the swap started.
    #[serde(default)]
    pub started_at: Option<i64>,
    /// Unix seconds when the swap finished. `None` while in flight.
    #[serde(default)]
    pub finished_at: Option<i64>,

    /// Maker amount in base units.
    #[serde(serialize_with = "plain_decimal")]
    pub maker_amount: BigDecimal,
    /// Taker amount in base units.
    #[serde(serialize_with = "plain_decimal")]
    pub taker_amount: BigDecimal,
    /// Maker coin USD price at execution time.
    #[serde(default, serialize_with = "plain_decimal_opt")]
    pub maker_coin_usd_price: Option<BigDecimal>,
    /// Taker coin USD price at execution time.
    #[serde(default, serialize_with = "plain_decimal_opt")]
    pub taker_coin_usd_price: Option<BigDecimal>,

    /// Swap outcome, when known.
    #[serde(default)]
    pub is_success: Option<bool>,
    /// Maker identity.
    #[serde(default)]
    pub maker_pubkey: Option<String>,
    /// Taker identity.
    #[serde(default)]
    pub taker_pubkey: Option<String>,
    /// Maker GUI (passthrough).
    #[serde(default)]
    pub maker_gui: Option<String>,
    /// Taker GUI (passthrough).
    #[serde(default)]
    pub taker_gui: Option<String>,
    /// Maker daemon version (passthrough).
    #[serde(default)]
    pub maker_version: Option<String>,
    /// Taker daemon version (passthrough).
    #[serde(default)]
    pub taker_version: Option<String>,
}

/// Borrowed view of one side of a swap.
#[derive(Debug, Clone)]
pub struct SwapLeg<'a> {
    /// Which side this leg is.
    pub role: SwapRole,
    /// Canonical coin symbol of the leg.
    pub symbol: String,
    /// Amount in base units.
    pub amount: &'a BigDecimal,
    /// Execution-time USD price, if recorded.
    pub usd_price: Option<&'a BigDecimal>,
    /// Participant identity, if known.
    pub pubkey: Option<&'a str>,
}

impl SwapRecord {
    /// Canonical maker coin.
    #[must_use]
    pub fn maker_symbol(&self) -> String {
        canonical_symbol(&self.maker_coin, self.maker_coin_ticker.as_deref())
    }

    /// Canonical taker coin.
    #[must_use]
    pub fn taker_symbol(&self) -> String {
        canonical_symbol(&self.taker_coin, self.taker_coin_ticker.as_deref())
    }

    /// Directional bucket key `MAKER|TAKER` built from canonical symbols.
    #[must_use]
    pub fn pair_key(&self) -> PairKey {
        PairKey::from_canonical(self.maker_symbol(), self.taker_symbol())
    }

    /// Maker side of the swap.
    #[must_use]
    pub fn maker_leg(&self) -> SwapLeg<'_> {
        SwapLeg {
            role: SwapRole::Maker,
            symbol: self.maker_symbol(),
            amount: &self.maker_amount,
            usd_price: self.maker_coin_usd_price.as_ref(),
            pubkey: non_blank(self.maker_pubkey.as_deref()),
        }
    }

    /// Taker side of the swap.
    #[must_use]
    pub fn taker_leg(&self) -> SwapLeg<'_> {
        SwapLeg {
            role: SwapRole::Taker,
            symbol: self.taker_symbol(),
            amount: &self.taker_amount,
            usd_price: self.taker_coin_usd_price.as_ref(),
            pubkey: non_blank(self.taker_pubkey.as_deref()),
        }
    }

    /// Both legs, maker first.
    #[must_use]
    pub fn legs(&self) -> [SwapLeg<'_>; 2] {
        [self.maker_leg(), self.taker_leg()]
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// `BigDecimal`'s `Display` switches to exponent notation for small and
// large magnitudes; amounts always go out as positional digits.
fn plain_decimal<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_plain_string())
}

fn plain_decimal_opt<S: Serializer>(
    value: &Option<BigDecimal>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_some(&v.to_plain_string()),
        None => serializer.serialize_none(),
    }
}

/// Converts a decimal to `f64` through its string form.
///
/// Only used at the aggregation boundary where USD math happens in
/// floating point. Values beyond `f64` range become infinite.
#[must_use]
pub fn decimal_to_f64(value: &BigDecimal) -> f64 {
    value.to_string().parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod test_support {
    use std::str::FromStr;

    use super::*;

    /// Parses a decimal literal.
    pub(crate) fn dec(raw: &str) -> BigDecimal {
        let Ok(value) = BigDecimal::from_str(raw) else {
            panic!("bad decimal literal {raw}");
        };
        value
    }

    /// Minimal completed swap used across the crate's tests.
    pub(crate) fn swap(
        uuid: &str,
        maker_coin: &str,
        taker_coin: &str,
        finished_at: i64,
        maker_amount: BigDecimal,
        taker_amount: BigDecimal,
    ) -> SwapRecord {
        SwapRecord {
            id: 1,
            uuid: uuid.to_string(),
            maker_coin: maker_coin.to_string(),
            taker_coin: taker_coin.to_string(),
            maker_coin_ticker: None,
            maker_coin_platform: None,
            taker_coin_ticker: None,
            taker_coin_platform: None,
            started_at: Some(finished_at - 10),
            finished_at: Some(finished_at),
            maker_amount,
            taker_amount,
            maker_coin_usd_price: None,
            taker_coin_usd_price: None,
            is_success: Some(true),
            maker_pubkey: None,
            taker_pubkey: None,
            maker_gui: None,
            taker_gui: None,
            maker_version: None,
            taker_version: None,
        }
    }
}
