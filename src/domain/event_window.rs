//! Named, pair-scoped time windows ("events").
//!
//! Windows are loaded once at startup from a JSON file and are immutable
//! afterwards. They protect their swaps from retention pruning and scope
//! the leaderboard queries.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use super::symbol::normalize_coin;
use crate::error::TrackerError;

/// A named promotion or competition period on one coin pair.
///
/// `start` and `stop` are inclusive unix seconds. The pair is
/// order-insensitive: a window on `KMD/DGB` covers swaps recorded in
/// either direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventWindow {
    /// Unique window name.
    pub name: String,
    /// Inclusive start, unix seconds.
    pub start: i64,
    /// Inclusive stop, unix seconds.
    pub stop: i64,
    /// Canonical base coin.
    pub base_coin: String,
    /// Canonical rel coin.
    pub rel_coin: String,
    /// Opaque metadata carried through to API consumers.
    pub extra: Map<String, Value>,
}

impl EventWindow {
    /// Creates a window, canonicalizing both coins.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidTimeRange`] when `start > stop`.
    pub fn new(
        name: impl Into<String>,
        start: i64,
        stop: i64,
        base_coin: &str,
        rel_coin: &str,
    ) -> Result<Self, TrackerError> {
        if start > stop {
            return Err(TrackerError::InvalidTimeRange { start, stop });
        }
        Ok(Self {
            name: name.into(),
            start,
            stop,
            base_coin: normalize_coin(base_coin),
            rel_coin: normalize_coin(rel_coin),
            extra: Map::new(),
        })
    }

    /// Attaches opaque metadata.
    #[must_use]
    pub fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }

    /// Returns `true` if `{a, b}` is this window's pair in either order.
    #[must_use]
    pub fn matches_pair(&self, a: &str, b: &str) -> bool {
        let a = normalize_coin(a);
        let b = normalize_coin(b);
        (a == self.base_coin && b == self.rel_coin) || (a == self.rel_coin && b == self.base_coin)
    }

    /// Same as [`Self::matches_pair`] for symbols already canonical.
    pub(crate) fn matches_canonical(&self, a: &str, b: &str) -> bool {
        (a == self.base_coin && b == self.rel_coin) || (a == self.rel_coin && b == self.base_coin)
    }

    /// Returns `true` if `ts` is inside `[start, stop]`.
    #[must_use]
    pub const fn contains(&self, ts: i64) -> bool {
        self.start <= ts && ts <= self.stop
    }
}

const RESERVED_KEYS: [&str; 6] = ["name", "event_name", "start", "stop", "base_coin", "rel_coin"];

/// Loads event windows from a JSON file.
///
/// A missing path (or an empty one) yields no windows. Individual entries
/// that fail to parse are skipped with a warning.
///
/// # Errors
///
/// Returns [`TrackerError::InvalidRequest`] if the file exists but cannot
/// be read or is not valid JSON.
pub fn load_event_windows(path: &Path) -> Result<Vec<EventWindow>, TrackerError> {
    if path.as_os_str().is_empty() || !path.exists() {
        tracing::info!(path = %path.display(), "no event window file, starting without events");
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path).map_err(|e| {
        TrackerError::InvalidRequest(format!("cannot read {}: {e}", path.display()))
    })?;
    parse_event_windows(&raw)
}

/// Parses the event window document.
///
/// Accepts a list of window objects, a `name -> window` map, or a grouped
/// map whose entries carry `rel_coins` instead of `rel_coin`.
///
/// # Errors
///
/// Returns [`TrackerError::InvalidRequest`] if `raw` is not valid JSON.
pub fn parse_event_windows(raw: &str) -> Result<Vec<EventWindow>, TrackerError> {
    let doc: Value = serde_json::from_str(raw)
        .map_err(|e| TrackerError::InvalidRequest(format!("invalid event json: {e}")))?;

    let mut windows = Vec::new();
    match doc {
        Value::Array(items) => {
            for item in &items {
                let Some(obj) = item.as_object() else {
                    tracing::warn!("skipping non-object event entry");
                    continue;
                };
                let name = obj
                    .get("name")
                    .or_else(|| obj.get("event_name"))
                    .and_then(Value::as_str)
                    .unwrap_or("event");
                push_parsed(&mut windows, name, parse_single(name, obj));
            }
        }
        Value::Object(groups) => {
            for (name, details) in &groups {
                let Some(obj) = details.as_object() else {
                    tracing::warn!(event = %name, "skipping non-object event entry");
                    continue;
                };
                if let Some(rel_coins) = obj.get("rel_coins").and_then(Value::as_array) {
                    for window in parse_group(name, obj, rel_coins) {
                        push_parsed(&mut windows, name, window);
                    }
                } else {
                    push_parsed(&mut windows, name, parse_single(name, obj));
                }
            }
        }
        _ => {
            tracing::warn!("event document is neither a list nor a map");
        }
    }

    Ok(dedupe_by_name(windows))
}

fn push_parsed(
    out: &mut Vec<EventWindow>,
    name: &str,
    parsed: Result<EventWindow, TrackerError>,
) {
    match parsed {
        Ok(window) => out.push(window),
        Err(e) => tracing::warn!(event = %name, error = %e, "skipping malformed event entry"),
    }
}

fn parse_single(name: &str, obj: &Map<String, Value>) -> Result<EventWindow, TrackerError> {
    let (start, stop, base) = common_fields(obj)?;
    let rel = string_field(obj, "rel_coin")?;
    let extra = obj
        .iter()
        .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Ok(EventWindow::new(name, start, stop, &base, &rel)?.with_extra(extra))
}

fn parse_group(
    group: &str,
    obj: &Map<String, Value>,
    rel_coins: &[Value],
) -> Vec<Result<EventWindow, TrackerError>> {
    let (start, stop, base) = match common_fields(obj) {
        Ok(fields) => fields,
        Err(e) => return vec![Err(e)],
    };
    let rels: Vec<String> = rel_coins
        .iter()
        .filter_map(Value::as_str)
        .map(normalize_coin)
        .filter(|c| !c.is_empty())
        .collect();

    let mut extra: Map<String, Value> = obj
        .iter()
        .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()) && k.as_str() != "rel_coins")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    extra.insert("group_name".to_string(), Value::String(group.to_string()));
    extra.insert(
        "rel_coins".to_string(),
        Value::Array(rels.iter().cloned().map(Value::String).collect()),
    );

    rels.iter()
        .map(|rel| {
            EventWindow::new(format!("{group}_{rel}"), start, stop, &base, rel)
                .map(|w| w.with_extra(extra.clone()))
        })
        .collect()
}

fn common_fields(obj: &Map<String, Value>) -> Result<(i64, i64, String), TrackerError> {
    Ok((
        int_field(obj, "start")?,
        int_field(obj, "stop")?,
        string_field(obj, "base_coin")?,
    ))
}

fn int_field(obj: &Map<String, Value>, key: &str) -> Result<i64, TrackerError> {
    match obj.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| TrackerError::InvalidRequest(format!("{key} out of range"))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| TrackerError::InvalidRequest(format!("{key} is not an integer"))),
        _ => Err(TrackerError::InvalidRequest(format!("missing {key}"))),
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Result<String, TrackerError> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| TrackerError::InvalidRequest(format!("missing {key}")))
}

fn dedupe_by_name(windows: Vec<EventWindow>) -> Vec<EventWindow> {
    let mut seen = HashSet::new();
    windows
        .into_iter()
        .filter(|w| {
            let fresh = seen.insert(w.name.clone());
            if !fresh {
                tracing::warn!(event = %w.name, "duplicate event name, keeping the first");
            }
            fresh
        })
        .collect()
}
