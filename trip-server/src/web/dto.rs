//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Connection, Location, RankedStation, Station};
use crate::planner::{PairFailure, TripPlan};

/// Query for the station search endpoint.
#[derive(Debug, Deserialize)]
pub struct StationSearchRequest {
    /// Partial station name
    pub q: String,

    /// Maximum results (default 10, capped at 50)
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct StationSearchResponse {
    pub stations: Vec<StationResult>,
}

/// A station in responses.
#[derive(Debug, Serialize)]
pub struct StationResult {
    pub id: String,
    pub name: String,
    pub standard_name: String,
    pub lat: f64,
    pub lng: f64,
}

impl From<&Station> for StationResult {
    fn from(station: &Station) -> Self {
        Self {
            id: station.id.to_string(),
            name: station.name.clone(),
            standard_name: station.standard_name.clone(),
            lat: station.location.lat(),
            lng: station.location.lng(),
        }
    }
}

/// A station with the travel time between it and the trip endpoint.
#[derive(Debug, Serialize)]
pub struct RankedStationResult {
    #[serde(flatten)]
    pub station: StationResult,

    pub travel_time_secs: i64,
}

impl From<&RankedStation> for RankedStationResult {
    fn from(ranked: &RankedStation) -> Self {
        Self {
            station: ranked.station().into(),
            travel_time_secs: ranked.travel_time_to().num_seconds(),
        }
    }
}

/// Request to plan a trip.
///
/// Locations are either `{"lat": .., "lng": ..}` or an address string.
#[derive(Debug, Deserialize)]
pub struct PlanTripRequest {
    pub origin: Location,
    pub destination: Location,

    /// Latest arrival at the destination (defaults to a fixed horizon from now)
    pub arrive_by: Option<DateTime<Utc>>,
}

/// A station pair whose lookup failed.
#[derive(Debug, Serialize)]
pub struct FailureResult {
    pub origin: String,
    pub destination: String,
    pub error: String,
}

impl From<&PairFailure> for FailureResult {
    fn from(failure: &PairFailure) -> Self {
        Self {
            origin: failure.origin.to_string(),
            destination: failure.destination.to_string(),
            error: failure.error.to_string(),
        }
    }
}

/// The planned trip.
#[derive(Debug, Serialize)]
pub struct PlanTripResponse {
    pub connection: Connection,

    /// Lower is better; `null` when the connection misses the deadline.
    pub score: Option<f64>,

    pub meets_deadline: bool,
    pub deadline: DateTime<Utc>,
    pub origin: RankedStationResult,
    pub destination: RankedStationResult,
    pub pairs_queried: usize,
    pub failures: Vec<FailureResult>,
    pub origin_shortlist: Vec<RankedStationResult>,
    pub destination_shortlist: Vec<RankedStationResult>,
}

impl PlanTripResponse {
    pub fn new(plan: TripPlan, deadline: DateTime<Utc>) -> Self {
        let selection = plan.selection;
        Self {
            score: selection.score.is_finite().then_some(selection.score),
            meets_deadline: selection.meets_deadline,
            deadline,
            origin: (&selection.origin).into(),
            destination: (&selection.destination).into(),
            pairs_queried: selection.pairs_queried,
            failures: selection.failures.iter().map(Into::into).collect(),
            origin_shortlist: plan.origin_shortlist.iter().map(Into::into).collect(),
            destination_shortlist: plan.destination_shortlist.iter().map(Into::into).collect(),
            connection: selection.connection,
        }
    }
}

/// Query for the crowd-density endpoint.
#[derive(Debug, Deserialize)]
pub struct BusyRequest {
    pub lat: f64,
    pub lng: f64,

    /// Moment of interest (defaults to now)
    pub at: Option<DateTime<Utc>>,
}

/// Query for the route-speed endpoint.
#[derive(Debug, Deserialize)]
pub struct BusySpeedRequest {
    /// Route as `lat,lng` points separated by `;`
    pub points: String,

    /// Search radius in metres
    pub radius: Option<u32>,

    /// Moment of interest (defaults to now)
    pub at: Option<DateTime<Utc>>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
