//! Google Maps web services client.
//!
//! Implements [`Geocoder`] with the Geocoding API and [`TravelTimeOracle`]
//! with the Distance Matrix API. Both report problems through a top-level
//! `status` string rather than HTTP status codes, so a `200 OK` response
//! can still be a failure.
//!
//! [`Geocoder`]: crate::planner::Geocoder
//! [`TravelTimeOracle`]: crate::planner::TravelTimeOracle

mod client;
mod error;
mod types;

pub use client::{MapsClient, MapsConfig, TravelMode};
pub use error::MapsError;
pub use types::{DistanceMatrixResponse, GeocodeResponse};
