//! iRail HTTP client.
//!
//! Fetches the station list and connections between stations. A semaphore
//! bounds the number of outstanding requests so a wide connection fan-out
//! does not trip the provider's rate limit.

use std::sync::Arc;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::{Connection, ConnectionQuery, Station};
use crate::planner::{ConnectionLookupError, ConnectionOracle};

use super::convert::{connection_params, convert_connections, convert_stations};
use super::error::IrailError;
use super::types::{ConnectionsResponse, StationsResponse};

/// Default base URL for the iRail API.
const DEFAULT_BASE_URL: &str = "https://api.irail.be";

/// Default response language.
const DEFAULT_LANG: &str = "nl";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 3;

/// iRail asks clients to identify themselves.
const CLIENT_USER_AGENT: &str = concat!("trip-server/", env!("CARGO_PKG_VERSION"));

/// Configuration for the iRail client.
#[derive(Debug, Clone)]
pub struct IrailConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Language for station names (`nl`, `fr`, `de`, `en`)
    pub lang: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for IrailConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            lang: DEFAULT_LANG.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 10,
        }
    }
}

impl IrailConfig {
    /// Set a custom base URL (for testing or a self-hosted mirror).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the response language.
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// iRail API client.
#[derive(Debug, Clone)]
pub struct IrailClient {
    http: reqwest::Client,
    base_url: String,
    lang: String,
    semaphore: Arc<Semaphore>,
}

impl IrailClient {
    /// Create a new iRail client with the given configuration.
    pub fn new(config: IrailConfig) -> Result<Self, IrailError> {
        if config.max_concurrent == 0 {
            return Err(IrailError::Config(
                "max_concurrent must be positive".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            lang: config.lang,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Fetch every station iRail knows about.
    ///
    /// Rows with unusable ids or coordinates are dropped.
    pub async fn fetch_stations(&self) -> Result<Vec<Station>, IrailError> {
        let response: StationsResponse = self.get_json("stations", Vec::new()).await?;
        let stations = convert_stations(&response);

        debug!(
            received = response.station.len(),
            kept = stations.len(),
            "Fetched iRail stations"
        );

        Ok(stations)
    }

    /// Fetch connections for a query, in provider order.
    pub async fn fetch_connections(
        &self,
        query: &ConnectionQuery,
    ) -> Result<Vec<Connection>, IrailError> {
        let response: ConnectionsResponse =
            self.get_json("connections", connection_params(query)).await?;
        let connections = convert_connections(&response);

        debug!(
            from = %query.from,
            to = %query.to,
            count = connections.len(),
            "Fetched iRail connections"
        );

        Ok(connections)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        mut params: Vec<(&'static str, String)>,
    ) -> Result<T, IrailError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| IrailError::Config("request semaphore closed".to_string()))?;

        params.push(("format", "json".to_string()));
        params.push(("lang", self.lang.clone()));

        let url = format!("{}/{}/", self.base_url, endpoint);
        let response = self.http.get(&url).query(&params).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(IrailError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IrailError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| IrailError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

impl From<IrailError> for ConnectionLookupError {
    fn from(err: IrailError) -> Self {
        match err {
            e if e.is_timeout() => ConnectionLookupError::Timeout,
            IrailError::Api { status, message } => ConnectionLookupError::Status { status, message },
            IrailError::RateLimited => ConnectionLookupError::Status {
                status: 429,
                message: "rate limited".to_string(),
            },
            e => ConnectionLookupError::Unavailable(e.to_string()),
        }
    }
}

impl ConnectionOracle for IrailClient {
    async fn connections(
        &self,
        query: &ConnectionQuery,
    ) -> Result<Vec<Connection>, ConnectionLookupError> {
        Ok(self.fetch_connections(query).await?)
    }
}
