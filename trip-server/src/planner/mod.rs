//! Trip planning core.
//!
//! Answers: "I am here and must be there by this time; which train should
//! I take?" Two steps do the work:
//!
//! - [`StationRanker`] finds the stations nearest a location, first by
//!   straight-line distance and then by real travel time.
//! - [`ConnectionSelector`] queries every origin/destination station pair
//!   concurrently and scores the returned connections.
//!
//! All external lookups go through the traits in [`oracle`], so the
//! algorithms run against mocks in tests and real HTTP clients in the server.

mod config;
pub mod oracle;
mod ranker;
mod score;
mod selector;
mod trip;

pub use config::PlannerConfig;
pub use oracle::{
    ConnectionLookupError, ConnectionOracle, GeocodeError, Geocoder, OracleError,
    TravelTimeOracle,
};
pub use ranker::{RankError, StationRanker, shortlist};
pub use score::{latest_departure_after, score, too_early};
pub use selector::{ConnectionSelector, PairFailure, SelectError, Selection};
pub use trip::{PlanError, TripPlan, TripPlanner, TripRequest};
