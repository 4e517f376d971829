//! iRail API response DTOs.
//!
//! These types map directly to the iRail JSON responses. Numeric values are
//! kept as [`Numeric`] because iRail sends most of them as strings but is
//! not consistent about it.

use serde::Deserialize;

/// A number that may arrive as a JSON string or a JSON number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Numeric {
    /// The value as a float, if it is numeric at all.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Numeric::Int(n) => Some(*n as f64),
            Numeric::Float(f) => Some(*f),
            Numeric::Text(s) => s.trim().parse().ok(),
        }
    }

    /// The value as an integer, truncating any fraction.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Numeric::Int(n) => Some(*n),
            Numeric::Float(f) if f.is_finite() => Some(*f as i64),
            Numeric::Float(_) => None,
            Numeric::Text(s) => {
                let s = s.trim();
                s.parse()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
            }
        }
    }
}

/// Response from `GET /stations/`.
#[derive(Debug, Clone, Deserialize)]
pub struct StationsResponse {
    #[serde(default)]
    pub station: Vec<StationDto>,
}

/// A station row.
#[derive(Debug, Clone, Deserialize)]
pub struct StationDto {
    /// Provider identifier, e.g. `BE.NMBS.008892007`.
    pub id: String,

    /// Longitude.
    #[serde(rename = "locationX")]
    pub location_x: Numeric,

    /// Latitude.
    #[serde(rename = "locationY")]
    pub location_y: Numeric,

    /// Name in the requested language.
    pub name: String,

    /// Name the connections endpoint accepts.
    pub standardname: String,
}

/// Response from `GET /connections/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionsResponse {
    #[serde(default)]
    pub connection: Vec<ConnectionDto>,
}

/// One connection.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionDto {
    pub departure: StopDto,
    pub arrival: StopDto,

    /// Total duration in seconds.
    pub duration: Numeric,

    /// Transfers; absent for direct trains.
    pub vias: Option<ViasDto>,
}

/// Departure or arrival end of a connection.
#[derive(Debug, Clone, Deserialize)]
pub struct StopDto {
    pub station: String,

    /// Unix timestamp.
    pub time: Numeric,

    pub platform: Option<String>,

    /// Delay in seconds.
    pub delay: Option<Numeric>,
}

/// Transfer summary.
#[derive(Debug, Clone, Deserialize)]
pub struct ViasDto {
    pub number: Numeric,
}
