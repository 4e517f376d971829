//! Trip planner server.
//!
//! A web application that answers: "I need to be at this place by this
//! time; which station do I leave from, and which train do I take?"

pub mod busy;
pub mod cache;
pub mod domain;
pub mod irail;
pub mod maps;
pub mod planner;
pub mod stations;
pub mod web;
