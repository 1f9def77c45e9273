use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::types::TripId;

/// Admin-settable parameter rejected by `RideError::InvalidParameter`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigParam {
    BaseRewardRate,
    CongestionMultiplier,
    MaxTrips,
}

impl fmt::Display for ConfigParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConfigParam::BaseRewardRate => "base reward rate",
            ConfigParam::CongestionMultiplier => "congestion multiplier",
            ConfigParam::MaxTrips => "trip capacity",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RideError {
    // ── Authorization ────────────────────────────────────────────────────────
    #[error("caller is not authorized for this operation")]
    NotAuthorized,

    #[error("caller is not the trusted oracle")]
    OracleNotTrusted,

    // ── Trip creation ────────────────────────────────────────────────────────
    #[error("driver may not be the initiating caller")]
    InvalidDriver,

    #[error("passenger count must be between {min} and {max}; got {got}")]
    InvalidPassengers { min: usize, max: usize, got: usize },

    #[error("route must be non-empty and at most {max} bytes")]
    InvalidRoute { max: usize },

    #[error("timestamp {got} is earlier than current time {now}")]
    InvalidTimestamp { got: u64, now: u64 },

    #[error("trip capacity of {max} reached")]
    MaxTripsExceeded { max: u64 },

    // ── Oracle attestation ───────────────────────────────────────────────────
    #[error("oracle did not attest valid GPS data")]
    InvalidGpsData,

    #[error("distance must be greater than zero")]
    InvalidDistance,

    #[error("congestion index must be within 0..={max}; got {got}")]
    InvalidCongestion { max: u32, got: u32 },

    // ── Lifecycle ────────────────────────────────────────────────────────────
    #[error("trip not found: {0}")]
    TripNotFound(TripId),

    #[error("no oracle submission for trip {0}")]
    OracleSubmissionNotFound(TripId),

    #[error("trip is not pending")]
    InvalidStatus,

    #[error("caller has already confirmed this trip")]
    AlreadyConfirmed,

    #[error("not enough confirmations: need {need}, got {got}")]
    InvalidConfirmations { need: u32, got: u32 },

    #[error("a dispute has already been raised on this trip")]
    DisputeAlreadyRaised,

    #[error("trip already verified")]
    TripAlreadyVerified,

    #[error("computed reward is not positive or overflowed")]
    InvalidReward,

    #[error("dispute reason must be non-empty and at most {max} bytes")]
    InvalidDisputeReason { max: usize },

    // ── Configuration ────────────────────────────────────────────────────────
    #[error("invalid {0}")]
    InvalidParameter(ConfigParam),

    // ── Reward minting ───────────────────────────────────────────────────────
    #[error("reward mint failed: {0}")]
    MintFailed(String),

    // ── Serialization / storage ──────────────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl RideError {
    /// Stable numeric error code, as exposed to callers on the wire.
    pub fn code(&self) -> u32 {
        match self {
            RideError::NotAuthorized => 100,
            RideError::InvalidDriver => 102,
            RideError::InvalidPassengers { .. } => 103,
            RideError::AlreadyConfirmed => 104,
            RideError::InvalidGpsData => 105,
            RideError::InvalidDistance => 106,
            RideError::InvalidCongestion { .. } => 107,
            RideError::TripAlreadyVerified => 108,
            RideError::TripNotFound(_) => 109,
            RideError::InvalidConfirmations { .. } => 110,
            RideError::InvalidReward => 111,
            RideError::OracleNotTrusted => 112,
            RideError::DisputeAlreadyRaised => 113,
            RideError::InvalidDisputeReason { .. } => 114,
            RideError::InvalidParameter(ConfigParam::BaseRewardRate) => 115,
            RideError::InvalidParameter(ConfigParam::CongestionMultiplier) => 116,
            RideError::InvalidStatus => 117,
            RideError::InvalidTimestamp { .. } => 118,
            RideError::MaxTripsExceeded { .. } => 119,
            RideError::InvalidParameter(ConfigParam::MaxTrips) => 120,
            RideError::InvalidRoute { .. } => 121,
            RideError::MintFailed(_) => 122,
            RideError::OracleSubmissionNotFound(_) => 123,
            RideError::Storage(_) => 900,
            RideError::Serialization(_) => 901,
        }
    }
}
