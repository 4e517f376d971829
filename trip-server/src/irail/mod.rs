//! iRail client.
//!
//! HTTP client for the iRail API, the open Belgian railway data service.
//! Supplies the station list and implements [`ConnectionOracle`].
//!
//! Things to know about iRail:
//! - Numeric fields (times, delays, durations, coordinates) usually arrive
//!   as JSON strings
//! - Times are Unix timestamps, but request parameters are local
//!   Belgian date/time strings
//! - A connection without transfers may omit the `vias` object entirely
//!
//! [`ConnectionOracle`]: crate::planner::ConnectionOracle

mod client;
mod convert;
mod error;
mod types;

pub use client::{IrailClient, IrailConfig};
pub use convert::{ConversionError, connection_params, convert_connections, convert_stations};
pub use error::IrailError;
pub use types::{ConnectionDto, ConnectionsResponse, StationDto, StationsResponse, StopDto};
