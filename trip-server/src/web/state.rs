//! Application state for the web layer.

use std::sync::Arc;

use crate::busy::BusyClient;
use crate::cache::{CacheConfig, CachedConnectionOracle, CachedGeocoder};
use crate::irail::IrailClient;
use crate::maps::MapsClient;
use crate::planner::PlannerConfig;
use crate::stations::StationDirectory;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub stations: StationDirectory<IrailClient>,

    /// Address lookups, cached
    pub geocoder: Arc<CachedGeocoder<MapsClient>>,

    /// Travel times to and from stations
    pub travel_times: Arc<MapsClient>,

    /// Connection lookups, cached
    pub connections: Arc<CachedConnectionOracle<IrailClient>>,

    pub busy: Arc<BusyClient>,

    pub config: Arc<PlannerConfig>,
}

impl AppState {
    pub fn new(
        stations: StationDirectory<IrailClient>,
        irail: IrailClient,
        maps: MapsClient,
        busy: BusyClient,
        config: PlannerConfig,
        cache_config: &CacheConfig,
    ) -> Self {
        Self {
            stations,
            geocoder: Arc::new(CachedGeocoder::new(maps.clone(), cache_config)),
            travel_times: Arc::new(maps),
            connections: Arc::new(CachedConnectionOracle::new(irail, cache_config)),
            busy: Arc::new(busy),
            config: Arc::new(config),
        }
    }
}
