//! Domain types for the trip planner.
//!
//! Coordinates, stations and transit connections. Types validate their
//! invariants at construction time, so code that receives them can trust
//! their contents.

mod connection;
mod point;
mod station;

pub use connection::{Connection, ConnectionQuery, Stop, TimeAnchor, TimeSelector};
pub use point::{InvalidPoint, Point};
pub use station::{InvalidStationId, Location, RankedStation, Station, StationId};
