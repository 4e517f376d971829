//! Web layer for the trip planner.
//!
//! JSON endpoints for station search, trip planning and crowd density.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
