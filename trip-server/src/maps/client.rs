//! Google Maps HTTP client.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Duration;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::Point;
use crate::planner::{GeocodeError, Geocoder, OracleError, TravelTimeOracle};

use super::error::MapsError;
use super::types::{DistanceMatrixResponse, GeocodeResponse};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

const DEFAULT_MAX_CONCURRENT: usize = 5;

/// How the traveller gets to and from stations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Walking,
    Driving,
    Bicycling,
    Transit,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Walking => "walking",
            TravelMode::Driving => "driving",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Transit => "transit",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "walking" => Ok(TravelMode::Walking),
            "driving" => Ok(TravelMode::Driving),
            "bicycling" => Ok(TravelMode::Bicycling),
            "transit" => Ok(TravelMode::Transit),
            other => Err(format!("unknown travel mode: {other}")),
        }
    }
}

/// Configuration for the Maps client.
#[derive(Debug, Clone)]
pub struct MapsConfig {
    pub api_key: String,
    pub base_url: String,
    pub mode: TravelMode,
    /// Region bias for geocoding (ccTLD code)
    pub region: Option<String>,
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl MapsConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            mode: TravelMode::default(),
            region: Some("be".to_string()),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 10,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_mode(mut self, mode: TravelMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the region bias; `None` disables it.
    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Google Maps API client.
#[derive(Debug, Clone)]
pub struct MapsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    mode: TravelMode,
    region: Option<String>,
    semaphore: Arc<Semaphore>,
}

impl MapsClient {
    pub fn new(config: MapsConfig) -> Result<Self, MapsError> {
        if config.api_key.trim().is_empty() {
            return Err(MapsError::Config("API key is empty".to_string()));
        }
        if config.max_concurrent == 0 {
            return Err(MapsError::Config(
                "max_concurrent must be positive".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            mode: config.mode,
            region: config.region,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Resolve an address to coordinates.
    pub async fn geocode_address(&self, address: &str) -> Result<Point, MapsError> {
        let mut params = vec![("address", address.to_string())];
        if let Some(region) = &self.region {
            params.push(("region", region.clone()));
        }

        let response: GeocodeResponse = self.get_json("geocode", params).await?;
        let point = response.into_point()?;

        debug!(address, point = %point, "Geocoded address");
        Ok(point)
    }

    /// Travel times from `origin` to each destination, in one request.
    pub async fn durations(
        &self,
        origin: Point,
        destinations: &[Point],
    ) -> Result<Vec<Duration>, MapsError> {
        if destinations.is_empty() {
            return Ok(Vec::new());
        }

        let params = matrix_params(origin, destinations, self.mode);
        let response: DistanceMatrixResponse = self.get_json("distancematrix", params).await?;
        response.into_durations(destinations.len())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        api: &str,
        mut params: Vec<(&'static str, String)>,
    ) -> Result<T, MapsError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| MapsError::Config("request semaphore closed".to_string()))?;

        params.push(("key", self.api_key.clone()));

        let url = format!("{}/maps/api/{}/json", self.base_url, api);
        let response = self.http.get(&url).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MapsError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| MapsError::Json {
            message: e.to_string(),
        })
    }
}

/// Distance Matrix parameters, excluding the key.
fn matrix_params(
    origin: Point,
    destinations: &[Point],
    mode: TravelMode,
) -> Vec<(&'static str, String)> {
    let destinations = destinations
        .iter()
        .map(Point::to_string)
        .collect::<Vec<_>>()
        .join("|");

    vec![
        ("origins", origin.to_string()),
        ("destinations", destinations),
        ("mode", mode.as_str().to_string()),
    ]
}

impl Geocoder for MapsClient {
    async fn geocode(&self, address: &str) -> Result<Point, GeocodeError> {
        Ok(self.geocode_address(address).await?)
    }
}

impl TravelTimeOracle for MapsClient {
    async fn travel_times(
        &self,
        origin: Point,
        destinations: &[Point],
    ) -> Result<Vec<Duration>, OracleError> {
        Ok(self.durations(origin, destinations).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = MapsConfig::new("key");

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.mode, TravelMode::Walking);
        assert_eq!(config.region.as_deref(), Some("be"));
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn config_builder() {
        let config = MapsConfig::new("key")
            .with_base_url("http://localhost:8080")
            .with_mode(TravelMode::Driving)
            .with_region(None)
            .with_max_concurrent(2)
            .with_timeout(3);

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.mode, TravelMode::Driving);
        assert_eq!(config.region, None);
        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(
            MapsClient::new(MapsConfig::new("  ")),
            Err(MapsError::Config(_))
        ));
    }

    #[test]
    fn travel_mode_parses() {
        assert_eq!("WALKING".parse::<TravelMode>(), Ok(TravelMode::Walking));
        assert_eq!("bicycling".parse::<TravelMode>(), Ok(TravelMode::Bicycling));
        assert!("teleport".parse::<TravelMode>().is_err());
        assert_eq!(TravelMode::Transit.to_string(), "transit");
    }

    #[test]
    fn matrix_params_join_destinations() {
        let origin = Point::new(51.05, 3.72).unwrap();
        let destinations = [
            Point::new(51.0359, 3.7107).unwrap(),
            Point::new(51.0561, 3.7405).unwrap(),
        ];

        let params = matrix_params(origin, &destinations, TravelMode::Walking);

        assert_eq!(
            params,
            vec![
                ("origins", "51.05,3.72".to_string()),
                ("destinations", "51.0359,3.7107|51.0561,3.7405".to_string()),
                ("mode", "walking".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn empty_batch_skips_request() {
        // Unroutable base URL: any request would fail
        let client = MapsClient::new(MapsConfig::new("key").with_base_url("http://127.0.0.1:9")).unwrap();
        let origin = Point::new(51.05, 3.72).unwrap();

        let durations = client.travel_times(origin, &[]).await.unwrap();
        assert!(durations.is_empty());
    }
}
