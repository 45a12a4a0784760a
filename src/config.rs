//! Tracker configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`, or the file named by `ENV_FILE`).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default remote coins configuration (symbol → CoinGecko id).
pub const DEFAULT_COIN_CONFIG_URL: &str =
    "https://raw.githubusercontent.com/KomodoPlatform/coins/master/utils/coins_config.json";

/// Default USD price endpoint.
pub const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

/// Top-level tracker configuration.
///
/// Loaded once at startup via [`TrackerConfig::from_env`].
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8000`).
    pub listen_addr: SocketAddr,

    /// Path of the trading daemon's SQLite database.
    pub db_path: PathBuf,

    /// Start from the first row (`true`) or from the current max id.
    pub load_history: bool,

    /// Interval between source polls.
    pub poll_interval: Duration,

    /// Backfill rows finished since this unix timestamp at startup.
    pub backfill_since: Option<i64>,

    /// Event window definition file.
    pub events_path: PathBuf,

    /// Retention horizon in hours.
    pub retention_hours: u64,

    /// Interval between retention sweeps.
    pub prune_interval: Duration,

    /// HMAC key for pubkey hashing. Empty means plain SHA-256.
    pub pubkey_hash_key: String,

    /// Optional local coins configuration file.
    pub coin_config_path: Option<PathBuf>,

    /// Remote coins configuration URL.
    pub coin_config_url: String,

    /// USD price endpoint.
    pub price_api_url: String,

    /// Interval between price refreshes.
    pub price_refresh: Duration,

    /// Whole-request timeout for outbound HTTP (coins config, prices).
    pub http_timeout: Duration,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,
}

impl TrackerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set or does
    /// not parse.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, std::net::AddrParseError> {
        match std::env::var("ENV_FILE") {
            Ok(file) => {
                dotenvy::from_filename(file).ok();
            }
            Err(_) => {
                dotenvy::dotenv().ok();
            }
        }

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
            .parse()?;

        let retention_hours = std::env::var("RETENTION_HOURS")
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map_or(1, |h| u64::try_from(h).unwrap_or(0));

        Ok(Self {
            listen_addr,
            db_path: PathBuf::from(env_or("KDF_DB_PATH", "MM2.db")),
            load_history: parse_env_bool("KDF_LOAD_HISTORY", true),
            poll_interval: Duration::from_millis(parse_env("POLL_INTERVAL_MS", 2_000)),
            backfill_since: std::env::var("BACKFILL_SINCE")
                .ok()
                .and_then(|v| v.trim().parse().ok()),
            events_path: PathBuf::from(env_or("EVENTS_JSON_PATH", "events.json")),
            retention_hours,
            prune_interval: Duration::from_secs(parse_env("PRUNE_INTERVAL_SECS", 60).max(1)),
            pubkey_hash_key: env_or("PUBKEY_HASH_KEY", "komodian"),
            coin_config_path: std::env::var("COIN_CONFIG_PATH").ok().map(PathBuf::from),
            coin_config_url: env_or("COIN_CONFIG_URL", DEFAULT_COIN_CONFIG_URL),
            price_api_url: env_or("PRICE_API_URL", DEFAULT_PRICE_API_URL),
            price_refresh: Duration::from_secs(parse_env("PRICE_REFRESH_SECS", 600).max(1)),
            http_timeout: Duration::from_secs(parse_env("HTTP_TIMEOUT_SECS", 15).max(1)),
            event_bus_capacity: parse_env("EVENT_BUS_CAPACITY", 1_024),
        })
    }

    /// Retention horizon in seconds.
    #[must_use]
    pub fn retention_secs(&self) -> i64 {
        i64::try_from(self.retention_hours.saturating_mul(3_600)).unwrap_or(i64::MAX)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"yes"`, `"false"`, `"0"`, `"no"` (case-insensitive). Returns `default`
/// otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key)
        .ok()
        .map(|v| v.trim().to_ascii_lowercase())
        .as_deref()
    {
        Some("true" | "1" | "yes") => true,
        Some("false" | "0" | "no") => false,
        _ => default,
    }
}
