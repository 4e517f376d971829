//! Geographic coordinates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when constructing an invalid [`Point`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid point: {reason}")]
pub struct InvalidPoint {
    reason: &'static str,
}

/// A latitude/longitude pair in degrees.
///
/// Values are finite and within range by construction.
///
/// # Examples
///
/// ```
/// use trip_server::domain::Point;
///
/// let gent = Point::new(51.0357, 3.7104).unwrap();
/// assert_eq!(gent.lat(), 51.0357);
///
/// assert!(Point::new(91.0, 0.0).is_err());
/// assert!("51.0357,3.7104".parse::<Point>().is_ok());
/// ```
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint", into = "RawPoint")]
pub struct Point {
    lat: f64,
    lng: f64,
}

impl Point {
    /// Create a point, validating latitude and longitude ranges.
    pub fn new(lat: f64, lng: f64) -> Result<Self, InvalidPoint> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(InvalidPoint {
                reason: "coordinates must be finite",
            });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidPoint {
                reason: "latitude must be within -90..=90",
            });
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(InvalidPoint {
                reason: "longitude must be within -180..=180",
            });
        }
        Ok(Self { lat, lng })
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Squared Euclidean distance in (lng, lat) degree space.
    ///
    /// A flat-plane approximation: only good enough to pre-filter
    /// candidates at city scale, never as a final ranking signal.
    pub fn squared_distance(&self, other: &Point) -> f64 {
        let dx = self.lng - other.lng;
        let dy = self.lat - other.lat;
        dx * dx + dy * dy
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({}, {})", self.lat, self.lng)
    }
}

/// Formats as `lat,lng`, the form map providers accept in query strings.
impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl FromStr for Point {
    type Err = InvalidPoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s.split_once(',').ok_or(InvalidPoint {
            reason: "expected \"lat,lng\"",
        })?;
        let lat = lat.trim().parse::<f64>().map_err(|_| InvalidPoint {
            reason: "latitude is not a number",
        })?;
        let lng = lng.trim().parse::<f64>().map_err(|_| InvalidPoint {
            reason: "longitude is not a number",
        })?;
        Point::new(lat, lng)
    }
}

#[derive(Serialize, Deserialize)]
struct RawPoint {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawPoint> for Point {
    type Error = InvalidPoint;

    fn try_from(raw: RawPoint) -> Result<Self, Self::Error> {
        Point::new(raw.lat, raw.lng)
    }
}

impl From<Point> for RawPoint {
    fn from(p: Point) -> Self {
        RawPoint {
            lat: p.lat,
            lng: p.lng,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any in-range pair constructs, and display/parse preserves it
        #[test]
        fn display_parse_roundtrip(lat in -90.0f64..=90.0, lng in -180.0f64..=180.0) {
            let p = Point::new(lat, lng).unwrap();
            let back: Point = p.to_string().parse().unwrap();
            prop_assert_eq!(p, back);
        }

        /// Distance is symmetric and non-negative
        #[test]
        fn distance_symmetric(
            a in (-90.0f64..=90.0, -180.0f64..=180.0),
            b in (-90.0f64..=90.0, -180.0f64..=180.0),
        ) {
            let a = Point::new(a.0, a.1).unwrap();
            let b = Point::new(b.0, b.1).unwrap();
            prop_assert!(a.squared_distance(&b) >= 0.0);
            prop_assert_eq!(a.squared_distance(&b), b.squared_distance(&a));
        }
    }
}
