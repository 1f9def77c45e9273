use rideproof_core::config::Configuration;
use rideproof_core::error::RideError;
use rideproof_core::trip::{OracleSubmission, Trip};
use rideproof_core::types::TripId;

/// Keyed storage for trips, oracle submissions and the configuration.
///
/// Append-only: records are inserted or overwritten in place, never
/// removed. `put_*` both inserts and updates.
pub trait TripStore: Send {
    fn get_trip(&self, id: TripId) -> Result<Option<Trip>, RideError>;
    fn put_trip(&mut self, trip: &Trip) -> Result<(), RideError>;

    fn get_submission(&self, trip_id: TripId) -> Result<Option<OracleSubmission>, RideError>;
    fn put_submission(&mut self, submission: &OracleSubmission) -> Result<(), RideError>;

    fn get_config(&self) -> Result<Option<Configuration>, RideError>;
    fn put_config(&mut self, config: &Configuration) -> Result<(), RideError>;

    /// Write a new trip together with the configuration that advances the
    /// trip counter. Backends that can should make this atomic.
    fn put_trip_and_config(&mut self, trip: &Trip, config: &Configuration) -> Result<(), RideError> {
        self.put_trip(trip)?;
        self.put_config(config)
    }

    fn trip_exists(&self, id: TripId) -> bool {
        matches!(self.get_trip(id), Ok(Some(_)))
    }
}
