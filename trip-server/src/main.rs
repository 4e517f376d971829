use std::error::Error;
use std::net::SocketAddr;
use std::time::Duration;

use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use trip_server::busy::{BusyClient, BusyConfig};
use trip_server::cache::CacheConfig;
use trip_server::irail::{IrailClient, IrailConfig};
use trip_server::maps::{MapsClient, MapsConfig, TravelMode};
use trip_server::planner::PlannerConfig;
use trip_server::stations::{StationCache, StationCacheConfig, StationDirectory};
use trip_server::web::{AppState, create_router};

/// How often to refresh the station list (24 hours).
const STATION_REFRESH_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

fn init_logger() {
    let default_level = LevelFilter::INFO;
    let rust_log =
        std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| default_level.to_string());
    let filter = EnvFilter::try_new(rust_log).unwrap_or_else(|err| {
        eprintln!(
            "invalid {}, falling back to level '{}' - {}",
            EnvFilter::DEFAULT_ENV,
            default_level,
            err,
        );
        EnvFilter::new(default_level.to_string())
    });

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logger();

    let maps_key = env("MAPS_API_KEY").ok_or("MAPS_API_KEY is not set")?;
    let mut maps_config = MapsConfig::new(maps_key);
    if let Some(mode) = env("MAPS_TRAVEL_MODE") {
        maps_config = maps_config.with_mode(mode.parse::<TravelMode>()?);
    }
    let maps = MapsClient::new(maps_config)?;

    let mut irail_config = IrailConfig::default();
    if let Some(url) = env("IRAIL_BASE_URL") {
        irail_config = irail_config.with_base_url(url);
    }
    let irail = IrailClient::new(irail_config)?;

    let mut busy_config = BusyConfig::default();
    if let Some(url) = env("BUSY_BASE_URL") {
        busy_config = busy_config.with_base_url(url);
    }
    let busy = BusyClient::new(busy_config)?;

    let cache_config = match env("STATION_CACHE_PATH") {
        Some(path) => StationCacheConfig::new(path),
        None => StationCacheConfig::default(),
    };
    info!(path = %cache_config.path.display(), "Loading stations");
    let stations = StationDirectory::load(irail.clone(), Some(StationCache::new(cache_config))).await?;
    info!(count = stations.len().await, "Stations ready");

    // Refresh daily in the background; the first tick fires immediately
    let refresh = stations.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(STATION_REFRESH_INTERVAL);
        interval.tick().await;
        loop {
            interval.tick().await;
            match refresh.refresh().await {
                Ok(count) => info!(count, "Refreshed stations"),
                Err(e) => warn!(error = %e, "Failed to refresh stations, keeping previous list"),
            }
        }
    });

    let state = AppState::new(
        stations,
        irail,
        maps,
        busy,
        PlannerConfig::default(),
        &CacheConfig::default(),
    );
    let app = create_router(state);

    let addr: SocketAddr = env("TRIP_LISTEN_ADDR")
        .as_deref()
        .unwrap_or(DEFAULT_LISTEN_ADDR)
        .parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Trip planner listening");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server stopped");
        return Err(e.into());
    }
    Ok(())
}
