//! End-to-end tests of the HTTP and WebSocket surface.
//!
//! Each test serves the full router on an ephemeral port and talks to it
//! with `reqwest` and `tokio-tungstenite`.

#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use bigdecimal::BigDecimal;
use futures_util::StreamExt;
use serde_json::Value;

use swap_tracker::api::build_app;
use swap_tracker::app_state::AppState;
use swap_tracker::domain::{EventBus, EventWindow, SwapIndex, SwapRecord};
use swap_tracker::identity::PubkeyHasher;
use swap_tracker::prices::StaticPrices;
use swap_tracker::service::TrackerService;

fn dec(raw: &str) -> BigDecimal {
    let Ok(value) = BigDecimal::from_str(raw) else {
        panic!("bad decimal literal {raw}");
    };
    value
}

fn record(uuid: &str, maker: &str, taker: &str, finished_at: i64) -> SwapRecord {
    SwapRecord {
        id: 1,
        uuid: uuid.to_string(),
        maker_coin: maker.to_string(),
        taker_coin: taker.to_string(),
        maker_coin_ticker: None,
        maker_coin_platform: None,
        taker_coin_ticker: None,
        taker_coin_platform: None,
        started_at: Some(finished_at - 30),
        finished_at: Some(finished_at),
        maker_amount: dec("10"),
        taker_amount: dec("5"),
        maker_coin_usd_price: Some(dec("2")),
        taker_coin_usd_price: Some(dec("10")),
        is_success: Some(true),
        maker_pubkey: Some(format!("maker-{uuid}")),
        taker_pubkey: Some(format!("taker-{uuid}")),
        maker_gui: None,
        taker_gui: None,
        maker_version: None,
        taker_version: None,
    }
}

struct TestServer {
    addr: SocketAddr,
    tracker: TrackerService,
    client: reqwest::Client,
}

impl TestServer {
    async fn start() -> Self {
        let tracker = TrackerService::new(Arc::new(SwapIndex::new(3_600)), EventBus::new(64));
        let Ok(window) = EventWindow::new("promo", 1_000, 2_000, "KMD", "DGB") else {
            panic!("valid window");
        };
        tracker.set_event_windows(vec![window]);
        tracker.ingest(record("s1", "KMD", "DGB", 1_100));
        tracker.ingest(record("s2", "DGB-segwit", "KMD", 1_500));
        tracker.ingest(record("s3", "KMD", "LTC", 1_200));

        let prices = Arc::new(StaticPrices::new().with_price("KMD", 1.0));
        let state = AppState::new(tracker.clone(), prices, PubkeyHasher::new("test-key"));
        let app = build_app(state);

        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind ephemeral port");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("local addr");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            tracker,
            client: reqwest::Client::new(),
        }
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let url = format!("http://{}{}", self.addr, path);
        let Ok(resp) = self.client.get(&url).send().await else {
            panic!("request to {url} failed");
        };
        let status = resp.status().as_u16();
        let Ok(body) = resp.json::<Value>().await else {
            panic!("non-json body from {url}");
        };
        (status, body)
    }
}

fn field<'a>(v: &'a Value, key: &str) -> &'a Value {
    let Some(inner) = v.get(key) else {
        panic!("missing field {key} in {v}");
    };
    inner
}

#[tokio::test]
async fn health_and_total() {
    let server = TestServer::start().await;

    let (status, body) = server.get("/health").await;
    assert_eq!(status, 200);
    assert_eq!(field(&body, "status"), "healthy");
    assert_eq!(field(&body, "total_swaps"), 3);

    let (status, body) = server.get("/api/v1/swaps/total").await;
    assert_eq!(status, 200);
    assert_eq!(body, serde_json::json!({ "total": 3 }));
}

#[tokio::test]
async fn swap_lookup_and_not_found() {
    let server = TestServer::start().await;

    let (status, body) = server.get("/api/v1/swaps/s2").await;
    assert_eq!(status, 200);
    assert_eq!(field(&body, "maker_symbol"), "DGB");
    assert_eq!(field(&body, "maker_amount"), "10");

    let (status, body) = server.get("/api/v1/swaps/missing").await;
    assert_eq!(status, 404);
    assert_eq!(field(field(&body, "error"), "code"), 2001);
    assert_eq!(field(field(&body, "error"), "message"), "swap not found");
}

#[tokio::test]
async fn amounts_keep_full_precision() {
    let server = TestServer::start().await;
    let mut big = record("big", "KMD", "DGB", 1_700);
    big.maker_amount = dec("123456789012345678901234567890.123456789");
    big.taker_amount = dec("0.00000000000000000000000000000001");
    server.tracker.ingest(big);

    let (status, body) = server.get("/api/v1/swaps/big").await;
    assert_eq!(status, 200);
    assert_eq!(
        field(&body, "maker_amount"),
        "123456789012345678901234567890.123456789"
    );
    assert_eq!(
        field(&body, "taker_amount"),
        "0.00000000000000000000000000000001"
    );

    let (status, body) = server.get("/api/v1/events/promo").await;
    assert_eq!(status, 200);
    assert_eq!(field(&body, "trade_count"), 3);
    assert_eq!(
        field(&body, "base_volume"),
        "123456789012345678901234567905.123456789"
    );
}

#[tokio::test]
async fn pair_stats_are_directional() {
    let server = TestServer::start().await;

    let (status, body) = server
        .get("/api/v1/stats/pair?maker_coin=kmd&taker_coin=DGB&start_ts=0&end_ts=5000")
        .await;
    assert_eq!(status, 200);
    assert_eq!(field(&body, "maker_coin"), "KMD");
    assert_eq!(field(&body, "total_swaps"), 1);
    assert_eq!(field(&body, "maker_amount_sum"), 10.0);

    let (status, _) = server
        .get("/api/v1/stats/pair?maker_coin=KMD&taker_coin=DGB&start_ts=10&end_ts=5")
        .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn event_overview_swaps_and_leaderboard() {
    let server = TestServer::start().await;

    let (status, body) = server.get("/api/v1/events").await;
    assert_eq!(status, 200);
    assert_eq!(field(&body, "data").as_array().map(Vec::len), Some(1));

    let (status, body) = server.get("/api/v1/events/promo").await;
    assert_eq!(status, 200);
    assert_eq!(field(&body, "trade_count"), 2);
    assert_eq!(field(&body, "user_count"), 4);
    assert_eq!(field(&body, "base_volume"), "15");
    assert_eq!(field(&body, "rel_volume"), "15");

    let (status, body) = server.get("/api/v1/events/promo/swaps?per_page=1").await;
    assert_eq!(status, 200);
    let Some(first) = field(&body, "data").as_array().and_then(|a| a.first()) else {
        panic!("one swap on the first page");
    };
    assert_eq!(field(first, "uuid"), "s2");
    assert_eq!(field(field(&body, "pagination"), "total_pages"), 2);

    let (status, body) = server.get("/api/v1/events/promo/traders").await;
    assert_eq!(status, 200);
    let Some(rows) = field(&body, "data").as_array() else {
        panic!("rows array");
    };
    assert_eq!(rows.len(), 4);
    let ranks: Vec<u64> = rows
        .iter()
        .filter_map(|r| r.get("rank").and_then(Value::as_u64))
        .collect();
    assert_eq!(ranks, vec![1, 2, 3, 4]);
    let Some(top) = rows.first() else {
        panic!("top row");
    };
    assert_eq!(field(top, "usd_total_value"), 70.0);
    assert_eq!(
        field(top, "pubkey_hash").as_str().map(str::len),
        Some(64)
    );

    let (status, body) = server
        .get("/api/v1/events/promo/traders?search=TAKER-S2")
        .await;
    assert_eq!(status, 200);
    assert_eq!(field(&body, "data").as_array().map(Vec::len), Some(1));

    let (status, _) = server
        .get("/api/v1/events/promo/traders?start=1800&stop=1200")
        .await;
    assert_eq!(status, 400);

    let (status, body) = server.get("/api/v1/events/nope").await;
    assert_eq!(status, 404);
    assert_eq!(field(field(&body, "error"), "code"), 2002);
}

#[tokio::test]
async fn identify_endpoint() {
    let server = TestServer::start().await;
    let hasher = PubkeyHasher::new("test-key");

    let (status, body) = server.get("/api/v1/identify?uuid=s1&ticker=dgb").await;
    assert_eq!(status, 200);
    assert_eq!(field(&body, "pubkey_hash").as_str(), Some(hasher.hash("taker-s1").as_str()));

    let (status, body) = server.get("/api/v1/identify?uuid=s1&ticker=LTC").await;
    assert_eq!(status, 400);
    assert_eq!(field(field(&body, "error"), "message"), "ticker not part of swap");

    let (status, _) = server.get("/api/v1/identify?uuid=zz&ticker=KMD").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn websocket_pushes_total_changes() {
    let server = TestServer::start().await;
    let url = format!("ws://{}/ws/total", server.addr);
    let Ok((mut ws, _)) = tokio_tungstenite::connect_async(url).await else {
        panic!("ws connect");
    };

    let next_total = |msg: Option<Result<tokio_tungstenite::tungstenite::Message, _>>| -> u64 {
        let Some(Ok(msg)) = msg else {
            panic!("expected a frame");
        };
        let Ok(text) = msg.to_text() else {
            panic!("expected text");
        };
        let Ok(v) = serde_json::from_str::<Value>(text) else {
            panic!("expected json");
        };
        v.get("total").and_then(Value::as_u64).unwrap_or(u64::MAX)
    };

    let first = tokio::time::timeout(Duration::from_secs(5), ws.next()).await;
    let Ok(first) = first else {
        panic!("no greeting frame");
    };
    assert_eq!(next_total(first), 3);

    server.tracker.ingest(record("s4", "KMD", "DGB", 1_900));
    let second = tokio::time::timeout(Duration::from_secs(5), ws.next()).await;
    let Ok(second) = second else {
        panic!("no update frame");
    };
    assert_eq!(next_total(second), 4);
}
