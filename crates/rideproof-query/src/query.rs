use rideproof_core::error::RideError;
use rideproof_core::trip::{OracleSubmission, Trip, TripStatus};
use rideproof_core::types::TripId;
use rideproof_state::TripStore;
use serde::Serialize;

/// Where a pending trip stands relative to its confirmation quorum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct QuorumProgress {
    pub confirmations: u32,
    pub required: u32,
    pub remaining: u32,
}

/// Query helpers for trips.
pub struct TripQuery<'a, S: TripStore> {
    store: &'a S,
}

impl<'a, S: TripStore> TripQuery<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Fetch a single trip by id.
    pub fn get(&self, id: TripId) -> Result<Option<Trip>, RideError> {
        self.store.get_trip(id)
    }

    pub fn submission(&self, id: TripId) -> Result<Option<OracleSubmission>, RideError> {
        self.store.get_submission(id)
    }

    fn require(&self, id: TripId) -> Result<Trip, RideError> {
        self.store.get_trip(id)?.ok_or(RideError::TripNotFound(id))
    }

    pub fn quorum(&self, id: TripId) -> Result<QuorumProgress, RideError> {
        let t = self.require(id)?;
        let required = t.quorum_required();
        Ok(QuorumProgress {
            confirmations: t.confirmations,
            required,
            remaining: required.saturating_sub(t.confirmations),
        })
    }

    /// True if the driver's `verify_trip` would pass every lifecycle check
    /// (the reward itself is not evaluated).
    pub fn is_verifiable(&self, id: TripId) -> Result<bool, RideError> {
        let t = self.require(id)?;
        Ok(t.status == TripStatus::Pending && !t.disputed && t.gps_verified && t.quorum_met())
    }

    /// Human-readable summary of a trip's state.
    pub fn describe(&self, id: TripId) -> Result<String, RideError> {
        let t = self.require(id)?;

        let status_str = match t.status {
            TripStatus::Pending if !t.gps_verified => {
                "Pending — awaiting oracle attestation".to_string()
            }
            TripStatus::Pending => {
                let need = t.quorum_required().saturating_sub(t.confirmations);
                if need > 0 {
                    format!("Pending — {} more confirmation(s) needed", need)
                } else {
                    "Pending — quorum met, ready to verify".to_string()
                }
            }
            TripStatus::Verified => format!("Verified at {} — reward {}", t.timestamp, t.reward),
            TripStatus::Disputed => format!("Disputed — {}", t.dispute_reason),
        };

        Ok(format!(
            "Trip {} | driver: {} | {} passenger(s) | route: {} | {}",
            t.id,
            t.driver,
            t.passengers.len(),
            t.route,
            status_str
        ))
    }
}
