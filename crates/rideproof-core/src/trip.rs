//! rideproof-core::trip
//!
//! Trip and oracle-attestation records as stored by the state layer.
//!
//! Lifecycle:  Pending ──verify──▶ Verified
//!                │
//!                └──dispute──▶ Disputed
//!
//! Both exits are terminal. Oracle fields stay zeroed until the trusted
//! oracle attests; the reward stays zero until verification.

use serde::{Deserialize, Serialize};

use crate::types::{Amount, CongestionIndex, Distance, Identity, LogicalTime, TripId};

// ── TripStatus ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Pending,
    Verified,
    Disputed,
}

impl TripStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TripStatus::Pending)
    }
}

// ── Trip ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    /// Primary key; equals the trip count at creation time.
    pub id: TripId,
    pub driver: Identity,
    /// 1..=10 passengers, in the order given at initiation.
    pub passengers: Vec<Identity>,
    pub start_time: LogicalTime,
    /// Set by the oracle; 0 until attested.
    pub end_time: LogicalTime,
    /// Set by the oracle; 0 until attested.
    pub distance: Distance,
    /// Set by the oracle; 0..=100.
    pub congestion_index: CongestionIndex,
    pub gps_verified: bool,
    pub status: TripStatus,
    /// Non-zero only once `status == Verified`.
    pub reward: Amount,
    /// Creation time, overwritten with the verification time on success.
    pub timestamp: LogicalTime,
    pub route: String,
    pub confirmations: u32,
    /// Identities that have confirmed, in order.
    #[serde(default)]
    pub confirmed_by: Vec<Identity>,
    pub disputed: bool,
    /// Empty unless `disputed`.
    pub dispute_reason: String,
}

impl Trip {
    /// A freshly initiated trip: pending, no oracle data, no confirmations.
    pub fn new(
        id: TripId,
        driver: Identity,
        passengers: Vec<Identity>,
        route: String,
        start_time: LogicalTime,
        created_at: LogicalTime,
    ) -> Self {
        Self {
            id,
            driver,
            passengers,
            start_time,
            end_time: 0,
            distance: 0,
            congestion_index: 0,
            gps_verified: false,
            status: TripStatus::Pending,
            reward: 0,
            timestamp: created_at,
            route,
            confirmations: 0,
            confirmed_by: Vec::new(),
            disputed: false,
            dispute_reason: String::new(),
        }
    }

    pub fn passenger_count(&self) -> usize {
        self.passengers.len()
    }

    pub fn is_passenger(&self, who: &Identity) -> bool {
        self.passengers.iter().any(|p| p == who)
    }

    /// Driver or any listed passenger.
    pub fn is_participant(&self, who: &Identity) -> bool {
        self.driver == *who || self.is_passenger(who)
    }

    pub fn has_confirmed(&self, who: &Identity) -> bool {
        self.confirmed_by.iter().any(|c| c == who)
    }

    /// Confirmations needed before the driver may verify: floor(passengers / 2).
    pub fn quorum_required(&self) -> u32 {
        (self.passengers.len() / 2) as u32
    }

    pub fn quorum_met(&self) -> bool {
        self.confirmations >= self.quorum_required()
    }
}

// ── OracleSubmission ─────────────────────────────────────────────────────────

/// Latest attestation for a trip. One per trip; a newer submission
/// overwrites the previous one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleSubmission {
    /// Trip this attests to (= primary key).
    pub trip_id: TripId,
    pub oracle: Identity,
    pub gps_valid: bool,
    pub distance: Distance,
    pub congestion: CongestionIndex,
    pub submitted_at: LogicalTime,
}
