//! swap-tracker server entry point.
//!
//! Starts the swap monitor, retention loop and price refresher, then serves
//! the REST and WebSocket endpoints until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use swap_tracker::api;
use swap_tracker::app_state::AppState;
use swap_tracker::config::TrackerConfig;
use swap_tracker::domain::{EventBus, SwapIndex, load_event_windows};
use swap_tracker::identity::PubkeyHasher;
use swap_tracker::prices::{CoinConfig, PriceCache, http_client};
use swap_tracker::service::{TrackerService, run_retention_loop};
use swap_tracker::source::{SwapMonitor, startup_ranges};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Load configuration
    let config = TrackerConfig::from_env().context("invalid LISTEN_ADDR")?;
    tracing::info!(addr = %config.listen_addr, db = %config.db_path.display(), "starting swap-tracker");

    // Event windows
    let windows = match load_event_windows(&config.events_path) {
        Ok(windows) => windows,
        Err(e) => {
            tracing::error!(error = %e, "event windows unavailable, starting without events");
            Vec::new()
        }
    };

    // Build domain and service layer
    let index = Arc::new(SwapIndex::new(config.retention_secs()));
    let event_bus = EventBus::new(config.event_bus_capacity);
    let tracker = TrackerService::new(index, event_bus);
    tracker.set_event_windows(windows.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Prices
    let client = http_client(config.http_timeout).context("cannot build HTTP client")?;
    let coins = CoinConfig::load(
        config.coin_config_path.as_deref(),
        &config.coin_config_url,
        &client,
    )
    .await;
    let prices = Arc::new(PriceCache::new(coins, config.price_api_url.clone(), client));
    prices.register_symbols(
        windows
            .iter()
            .flat_map(|w| [w.base_coin.as_str(), w.rel_coin.as_str()]),
    );
    let price_task = tokio::spawn(Arc::clone(&prices).run(config.price_refresh, shutdown_rx.clone()));

    // Startup backfill, then live polling
    let monitor = SwapMonitor::new(
        config.db_path.clone(),
        tracker.clone(),
        config.poll_interval,
        config.load_history,
    );
    let ranges = startup_ranges(config.backfill_since, Utc::now().timestamp(), &windows);
    if let Err(e) = monitor.backfill(&ranges).await {
        tracing::warn!(error = %e, "startup backfill failed");
    }
    let monitor_task = tokio::spawn(monitor.run(shutdown_rx.clone()));
    let retention_task = tokio::spawn(run_retention_loop(
        tracker.clone(),
        config.prune_interval,
        shutdown_rx,
    ));

    // Build application
    let state = AppState::new(tracker, prices, PubkeyHasher::new(&config.pubkey_hash_key));
    let app = api::build_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("cannot bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "ctrl-c handler failed");
            }
            tracing::info!("shutdown requested");
        })
        .await?;

    let _ = shutdown_tx.send(true);
    for task in [monitor_task, retention_task, price_task] {
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "background task ended abnormally");
        }
    }
    tracing::info!("swap-tracker stopped");
    Ok(())
}
