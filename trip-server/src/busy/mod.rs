//! Crowd-density service client.
//!
//! Asks how busy a spot is at a given hour and weekday, and how fast
//! traffic moves along a route. Answers are passed through as raw JSON.

mod client;
mod error;

pub use client::{BusyClient, BusyConfig, DEFAULT_RADIUS_M};
pub use error::BusyError;
