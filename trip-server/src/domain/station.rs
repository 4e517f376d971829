//! Station types.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::Point;

/// Error returned when parsing an invalid station identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station id: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// An opaque station identifier, unique within one station list.
///
/// Transit providers use URI-like ids (`BE.NMBS.008892007`); the only
/// requirement here is that the id is non-empty and has no surrounding
/// whitespace.
///
/// # Examples
///
/// ```
/// use trip_server::domain::StationId;
///
/// let id = StationId::parse("BE.NMBS.008892007").unwrap();
/// assert_eq!(id.as_str(), "BE.NMBS.008892007");
///
/// assert!(StationId::parse("").is_err());
/// assert!(StationId::parse(" X ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationId(String);

impl StationId {
    /// Parse a station id.
    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        if s.is_empty() {
            return Err(InvalidStationId {
                reason: "must not be empty",
            });
        }
        if s.trim() != s {
            return Err(InvalidStationId {
                reason: "must not have surrounding whitespace",
            });
        }
        Ok(StationId(s.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for StationId {
    type Error = InvalidStationId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        StationId::parse(&s)
    }
}

impl From<StationId> for String {
    fn from(id: StationId) -> Self {
        id.0
    }
}

/// A transit station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,

    /// Display name (may be localised).
    pub name: String,

    /// Name the transit provider uses as its routing key.
    pub standard_name: String,

    pub location: Point,
}

impl Station {
    /// Create a new station.
    pub fn new(
        id: StationId,
        name: impl Into<String>,
        standard_name: impl Into<String>,
        location: Point,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            standard_name: standard_name.into(),
            location,
        }
    }
}

/// A station annotated with the travel time between it and a ranking origin.
///
/// The travel time is fixed at construction; a new ranking produces new
/// values rather than updating old ones.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedStation {
    station: Station,
    travel_time_to: Duration,
}

impl RankedStation {
    /// Attach a travel time to a station. Negative durations clamp to zero.
    pub fn new(station: Station, travel_time_to: Duration) -> Self {
        Self {
            station,
            travel_time_to: travel_time_to.max(Duration::zero()),
        }
    }

    pub fn station(&self) -> &Station {
        &self.station
    }

    /// Travel time between the ranking origin and this station.
    pub fn travel_time_to(&self) -> Duration {
        self.travel_time_to
    }

    pub fn into_station(self) -> Station {
        self.station
    }
}

/// Where a search starts or ends: coordinates, or an address still to be
/// geocoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Point(Point),
    Address(String),
}

impl From<Point> for Location {
    fn from(p: Point) -> Self {
        Location::Point(p)
    }
}
