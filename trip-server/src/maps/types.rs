//! Google Maps response DTOs.

use chrono::Duration;
use serde::Deserialize;

use crate::domain::Point;

use super::error::MapsError;

/// The status every successful answer carries.
const OK: &str = "OK";

/// Response from the Geocoding API.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,

    #[serde(default)]
    pub results: Vec<GeocodeResult>,

    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: Option<String>,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl GeocodeResponse {
    /// The location of the best match.
    pub fn into_point(self) -> Result<Point, MapsError> {
        if self.status != OK {
            return Err(MapsError::Status {
                status: self.status,
                message: self.error_message,
            });
        }

        let first = self.results.into_iter().next().ok_or_else(|| MapsError::Status {
            status: "ZERO_RESULTS".to_string(),
            message: None,
        })?;

        let LatLng { lat, lng } = first.geometry.location;
        Point::new(lat, lng).map_err(|e| MapsError::Malformed(e.to_string()))
    }
}

/// Response from the Distance Matrix API.
#[derive(Debug, Clone, Deserialize)]
pub struct DistanceMatrixResponse {
    pub status: String,

    #[serde(default)]
    pub rows: Vec<MatrixRow>,

    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatrixRow {
    #[serde(default)]
    pub elements: Vec<MatrixElement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatrixElement {
    pub status: String,
    pub duration: Option<TextValue>,
}

/// A `{ "text": "5 mins", "value": 300 }` pair.
#[derive(Debug, Clone, Deserialize)]
pub struct TextValue {
    pub value: i64,
}

impl DistanceMatrixResponse {
    /// Durations from the single origin to each destination, in request
    /// order. Any element without an `OK` status fails the whole batch.
    pub fn into_durations(self, expected: usize) -> Result<Vec<Duration>, MapsError> {
        if self.status != OK {
            return Err(MapsError::Status {
                status: self.status,
                message: self.error_message,
            });
        }

        let row_count = self.rows.len();
        let mut rows = self.rows.into_iter();
        let (Some(row), None) = (rows.next(), rows.next()) else {
            return Err(MapsError::Malformed(format!(
                "expected 1 row, got {row_count}"
            )));
        };

        if row.elements.len() != expected {
            return Err(MapsError::Malformed(format!(
                "expected {expected} elements, got {}",
                row.elements.len()
            )));
        }

        row.elements
            .into_iter()
            .map(|element| {
                if element.status != OK {
                    return Err(MapsError::Status {
                        status: element.status,
                        message: None,
                    });
                }
                let value = element
                    .duration
                    .ok_or_else(|| MapsError::Malformed("element has no duration".to_string()))?
                    .value;
                Duration::try_seconds(value).ok_or_else(|| {
                    MapsError::Malformed(format!("duration out of range: {value}"))
                })
            })
            .collect()
    }
}
