//! External capabilities the planner depends on.
//!
//! The planner never talks to a provider directly. It is handed
//! implementations of these traits, which lets it be tested with mock
//! oracles and lets the web layer wrap real clients in caches.

use std::future::Future;
use std::time::Duration as StdDuration;

use chrono::Duration;

use crate::domain::{Connection, ConnectionQuery, Point};

/// Geocoding failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeocodeError {
    /// The provider answered with a non-OK status (e.g. `ZERO_RESULTS`).
    #[error("geocoder returned status {status}")]
    Status { status: String },

    /// The request itself failed.
    #[error("geocoder unavailable: {0}")]
    Unavailable(String),

    #[error("geocoder timed out")]
    Timeout,
}

/// The travel-time oracle failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// The provider answered with a non-OK status.
    #[error("travel-time oracle returned status {status}")]
    Status { status: String },

    /// The response did not line up with the request.
    #[error("malformed travel-time response: {0}")]
    Malformed(String),

    #[error("travel-time oracle unavailable: {0}")]
    Unavailable(String),

    #[error("travel-time oracle timed out")]
    Timeout,
}

/// The connection oracle failed for one station pair.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionLookupError {
    #[error("connection lookup returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("connection lookup unavailable: {0}")]
    Unavailable(String),

    #[error("connection lookup timed out")]
    Timeout,
}

/// Resolves free-text addresses to coordinates.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> impl Future<Output = Result<Point, GeocodeError>> + Send;
}

/// Estimates travel time from one point to many.
pub trait TravelTimeOracle {
    /// Returns one duration per destination, in the same order.
    ///
    /// Implementations should issue a single batched request per call.
    fn travel_times(
        &self,
        origin: Point,
        destinations: &[Point],
    ) -> impl Future<Output = Result<Vec<Duration>, OracleError>> + Send;
}

/// Looks up transit connections between two stations.
pub trait ConnectionOracle {
    fn connections(
        &self,
        query: &ConnectionQuery,
    ) -> impl Future<Output = Result<Vec<Connection>, ConnectionLookupError>> + Send;
}

/// Run an oracle call with an upper bound; `None` means it timed out.
pub(crate) async fn with_timeout<F: Future>(limit: StdDuration, fut: F) -> Option<F::Output> {
    tokio::time::timeout(limit, fut).await.ok()
}
