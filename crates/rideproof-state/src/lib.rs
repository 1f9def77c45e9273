//! rideproof-state
//!
//! Trip storage and the trip lifecycle engine.
//!
//! `TripStore` is the keyed-store seam; `MemoryStore` and the sled-backed
//! `StateDb` implement it. `TripEngine` runs every trip-affecting operation
//! against a store and hands verified rewards to a `MintGateway`.

pub mod db;
pub mod engine;
pub mod memory;
pub mod mint;
pub mod store;

pub use db::StateDb;
pub use engine::TripEngine;
pub use memory::MemoryStore;
pub use mint::{MintGateway, MintRecord, MintRequest, RecordingMint};
pub use store::TripStore;
