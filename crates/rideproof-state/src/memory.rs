use std::collections::HashMap;

use rideproof_core::config::Configuration;
use rideproof_core::error::RideError;
use rideproof_core::trip::{OracleSubmission, Trip};
use rideproof_core::types::TripId;

use crate::store::TripStore;

/// In-process store. Trips live in an arena indexed by their id, which
/// works because ids are assigned sequentially from zero.
#[derive(Default, Debug, Clone)]
pub struct MemoryStore {
    trips: Vec<Trip>,
    submissions: HashMap<TripId, OracleSubmission>,
    config: Option<Configuration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }
}

impl TripStore for MemoryStore {
    fn get_trip(&self, id: TripId) -> Result<Option<Trip>, RideError> {
        Ok(usize::try_from(id).ok().and_then(|i| self.trips.get(i)).cloned())
    }

    fn put_trip(&mut self, trip: &Trip) -> Result<(), RideError> {
        let idx = usize::try_from(trip.id)
            .map_err(|_| RideError::Storage(format!("trip id {} out of range", trip.id)))?;
        match idx.cmp(&self.trips.len()) {
            std::cmp::Ordering::Less => self.trips[idx] = trip.clone(),
            std::cmp::Ordering::Equal => self.trips.push(trip.clone()),
            std::cmp::Ordering::Greater => {
                return Err(RideError::Storage(format!(
                    "non-sequential trip id {} (next is {})",
                    trip.id,
                    self.trips.len()
                )))
            }
        }
        Ok(())
    }

    fn get_submission(&self, trip_id: TripId) -> Result<Option<OracleSubmission>, RideError> {
        Ok(self.submissions.get(&trip_id).cloned())
    }

    fn put_submission(&mut self, submission: &OracleSubmission) -> Result<(), RideError> {
        self.submissions.insert(submission.trip_id, submission.clone());
        Ok(())
    }

    fn get_config(&self) -> Result<Option<Configuration>, RideError> {
        Ok(self.config.clone())
    }

    fn put_config(&mut self, config: &Configuration) -> Result<(), RideError> {
        self.config = Some(config.clone());
        Ok(())
    }
}
