//! Read-only aggregations over the swap index.
//!
//! Everything here is a pure function of the index contents, an event
//! window and a [`PriceProvider`]. Missing optional data (pubkeys, prices,
//! tickers) degrades the affected value instead of failing the query.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use bigdecimal::BigDecimal;
use serde::Serialize;

use crate::domain::{EventWindow, SwapIndex, SwapLeg, SwapRecord, SwapRole, decimal_to_f64};
use crate::prices::PriceProvider;

/// Which side of an event pair a swap leg counts towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Base,
    Rel,
}

fn side_of(event: &EventWindow, symbol: &str) -> Option<Side> {
    if symbol == event.base_coin {
        Some(Side::Base)
    } else if symbol == event.rel_coin {
        Some(Side::Rel)
    } else {
        None
    }
}

/// Summary of trading activity inside one event window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventOverview {
    /// Event name.
    pub name: String,
    /// Window start.
    pub start: i64,
    /// Window stop.
    pub stop: i64,
    /// Base coin of the pair.
    pub base_coin: String,
    /// Rel coin of the pair.
    pub rel_coin: String,
    /// Swaps in the window, both directions.
    pub trade_count: usize,
    /// Distinct pubkeys seen on either side.
    pub user_count: usize,
    /// Total base coin traded.
    pub base_volume: BigDecimal,
    /// Total rel coin traded.
    pub rel_volume: BigDecimal,
    /// Current base coin price.
    pub base_price_usd: Option<f64>,
    /// Current rel coin price.
    pub rel_price_usd: Option<f64>,
    /// `base_volume` at the current price (zero when unknown).
    pub usd_base_value: f64,
    /// `rel_volume` at the current price (zero when unknown).
    pub usd_rel_value: f64,
    /// Sum of both USD values.
    pub usd_total_value: f64,
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraderRow {
    /// 1-based rank among every trader of the event.
    pub rank: usize,
    /// Trader identity.
    pub pubkey: String,
    /// Base coin volume of the swaps the trader took part in.
    pub base_volume: BigDecimal,
    /// Rel coin volume of the swaps the trader took part in.
    pub rel_volume: BigDecimal,
    /// USD value of `base_volume`.
    pub usd_base_value: f64,
    /// USD value of `rel_volume`.
    pub usd_rel_value: f64,
    /// Sum of both USD values; the ranking key.
    pub usd_total_value: f64,
    /// Average base coin price paid, or the live price without volume.
    pub base_price_usd: Option<f64>,
    /// Average rel coin price paid, or the live price without volume.
    pub rel_price_usd: Option<f64>,
    /// Swaps where the trader was maker.
    pub trades_as_maker: u64,
    /// Swaps where the trader was taker.
    pub trades_as_taker: u64,
    /// All swaps of the trader.
    pub trades_total: u64,
    /// Most recent completion time.
    pub last_trade_at: i64,
}

/// Swaps of the event's pair inside its window, most recent first.
#[must_use]
pub fn event_swaps(index: &SwapIndex, event: &EventWindow) -> Vec<Arc<SwapRecord>> {
    index.swaps_for_pair(&event.base_coin, &event.rel_coin, event.start, event.stop)
}

/// Trade count, users, volumes and their current USD value for an event.
#[must_use]
pub fn event_overview(
    index: &SwapIndex,
    event: &EventWindow,
    prices: &dyn PriceProvider,
) -> EventOverview {
    let swaps = event_swaps(index, event);

    let mut base_volume = BigDecimal::default();
    let mut rel_volume = BigDecimal::default();
    let mut users: HashSet<&str> = HashSet::new();
    for swap in &swaps {
        for leg in swap.legs() {
            match side_of(event, &leg.symbol) {
                Some(Side::Base) => base_volume += leg.amount,
                Some(Side::Rel) => rel_volume += leg.amount,
                None => {}
            }
            if let Some(pubkey) = leg.pubkey {
                users.insert(pubkey);
            }
        }
    }

    let base_price_usd = prices.price_usd(&event.base_coin);
    let rel_price_usd = prices.price_usd(&event.rel_coin);
    let usd_base_value = decimal_to_f64(&base_volume) * base_price_usd.unwrap_or(0.0);
    let usd_rel_value = decimal_to_f64(&rel_volume) * rel_price_usd.unwrap_or(0.0);

    EventOverview {
        name: event.name.clone(),
        start: event.start,
        stop: event.stop,
        base_coin: event.base_coin.clone(),
        rel_coin: event.rel_coin.clone(),
        trade_count: swaps.len(),
        user_count: users.len(),
        base_volume,
        rel_volume,
        base_price_usd,
        rel_price_usd,
        usd_base_value,
        usd_rel_value,
        usd_total_value: usd_base_value + usd_rel_value,
    }
}

/// What one swap adds to each of its participants.
#[derive(Debug, Default)]
struct Contribution {
    base_volume: BigDecimal,
    rel_volume: BigDecimal,
    usd_base: f64,
    usd_rel: f64,
}

impl Contribution {
    fn of(swap: &SwapRecord, event: &EventWindow, prices: &dyn PriceProvider) -> Self {
        let mut c = Self::default();
        for leg in swap.legs() {
            let Some(side) = side_of(event, &leg.symbol) else {
                continue;
            };
            let value = decimal_to_f64(leg.amount) * leg_price(&leg, prices);
            match side {
                Side::Base => {
                    c.base_volume += leg.amount;
                    c.usd_base += value;
                }
                Side::Rel => {
                    c.rel_volume += leg.amount;
                    c.usd_rel += value;
                }
            }
        }
        c
    }
}

/// Execution-time price, else live price, else zero.
fn leg_price(leg: &SwapLeg<'_>, prices: &dyn PriceProvider) -> f64 {
    leg.usd_price
        .map(decimal_to_f64)
        .or_else(|| prices.price_usd(&leg.symbol))
        .unwrap_or(0.0)
}

#[derive(Debug)]
struct TraderAcc {
    pubkey: String,
    base_volume: BigDecimal,
    rel_volume: BigDecimal,
    usd_base: f64,
    usd_rel: f64,
    as_maker: u64,
    as_taker: u64,
    last_trade_at: i64,
}

impl TraderAcc {
    fn new(pubkey: &str) -> Self {
        Self {
            pubkey: pubkey.to_string(),
            base_volume: BigDecimal::default(),
            rel_volume: BigDecimal::default(),
            usd_base: 0.0,
            usd_rel: 0.0,
            as_maker: 0,
            as_taker: 0,
            last_trade_at: i64::MIN,
        }
    }

    fn add(&mut self, c: &Contribution, role: SwapRole, finished_at: i64) {
        self.base_volume += &c.base_volume;
        self.rel_volume += &c.rel_volume;
        self.usd_base += c.usd_base;
        self.usd_rel += c.usd_rel;
        match role {
            SwapRole::Maker => self.as_maker += 1,
            SwapRole::Taker => self.as_taker += 1,
        }
        self.last_trade_at = self.last_trade_at.max(finished_at);
    }

    fn total(&self) -> f64 {
        self.usd_base + self.usd_rel
    }
}

/// Average price from accumulated value, or the live price without volume.
fn average_price(usd: f64, volume: &BigDecimal, live: Option<f64>) -> Option<f64> {
    let volume = decimal_to_f64(volume);
    if volume > 0.0 { Some(usd / volume) } else { live }
}

/// Per-trader leaderboard for an event over `[start, stop]`.
///
/// Both participants of a swap are credited with the swap's full base and
/// rel contribution. Ranks are assigned across all traders by descending
/// USD total, ties broken by pubkey; `pubkey_search` (case-insensitive
/// substring) filters the ranked rows without renumbering them.
#[must_use]
pub fn aggregate_trader_metrics(
    index: &SwapIndex,
    event: &EventWindow,
    start: i64,
    stop: i64,
    prices: &dyn PriceProvider,
    pubkey_search: Option<&str>,
) -> Vec<TraderRow> {
    let swaps = index.swaps_for_pair(&event.base_coin, &event.rel_coin, start, stop);

    let mut traders: Vec<TraderAcc> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    for swap in &swaps {
        let Some(finished_at) = swap.finished_at else {
            continue;
        };
        let contribution = Contribution::of(swap, event, prices);
        for leg in swap.legs() {
            let Some(pubkey) = leg.pubkey else {
                continue;
            };
            let slot = *slots.entry(pubkey.to_string()).or_insert_with(|| {
                traders.push(TraderAcc::new(pubkey));
                traders.len() - 1
            });
            if let Some(acc) = traders.get_mut(slot) {
                acc.add(&contribution, leg.role, finished_at);
            }
        }
    }

    traders.sort_by(|a, b| {
        b.total()
            .total_cmp(&a.total())
            .then_with(|| a.pubkey.cmp(&b.pubkey))
    });

    let live_base = prices.price_usd(&event.base_coin);
    let live_rel = prices.price_usd(&event.rel_coin);
    let needle = pubkey_search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    traders
        .into_iter()
        .enumerate()
        .filter(|(_, acc)| {
            needle
                .as_deref()
                .is_none_or(|n| acc.pubkey.to_lowercase().contains(n))
        })
        .map(|(i, acc)| TraderRow {
            rank: i + 1,
            base_price_usd: average_price(acc.usd_base, &acc.base_volume, live_base),
            rel_price_usd: average_price(acc.usd_rel, &acc.rel_volume, live_rel),
            usd_total_value: acc.total(),
            trades_total: acc.as_maker + acc.as_taker,
            pubkey: acc.pubkey,
            base_volume: acc.base_volume,
            rel_volume: acc.rel_volume,
            usd_base_value: acc.usd_base,
            usd_rel_value: acc.usd_rel,
            trades_as_maker: acc.as_maker,
            trades_as_taker: acc.as_taker,
            last_trade_at: acc.last_trade_at,
        })
        .collect()
}
