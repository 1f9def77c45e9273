//! rideproof-query
//!
//! Read-side helpers over any `TripStore`. State changes go through
//! `rideproof_state::TripEngine`; this crate only inspects.

pub mod query;

pub use query::{QuorumProgress, TripQuery};
