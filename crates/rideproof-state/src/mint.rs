//! Reward mint gateway.
//!
//! The engine calls `mint` exactly once per verified trip, after every
//! precondition has passed and before the trip is marked verified. A
//! gateway error aborts verification.

use std::sync::Mutex;

use rideproof_core::error::RideError;
use rideproof_core::types::{Amount, Identity, LogicalTime, TripId};
use serde::{Deserialize, Serialize};

/// One reward disbursement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRequest {
    /// Opaque token-contract reference from the configuration.
    pub token_contract: Identity,
    pub trip_id: TripId,
    pub amount: Amount,
    pub driver: Identity,
    pub passengers: Vec<Identity>,
}

/// A mint as persisted by `StateDb`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRecord {
    pub request: MintRequest,
    /// BLAKE3 of (trip_id_be8 || amount_be16 || driver || passengers…), hex.
    pub receipt: String,
    pub minted_at: LogicalTime,
}

impl MintRecord {
    pub fn new(request: MintRequest, minted_at: LogicalTime) -> Self {
        let receipt = receipt_id(&request);
        Self { request, receipt, minted_at }
    }
}

/// Deterministic receipt id for a mint request.
pub fn receipt_id(req: &MintRequest) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&req.trip_id.to_be_bytes());
    hasher.update(&req.amount.to_be_bytes());
    hasher.update(req.token_contract.as_str().as_bytes());
    hasher.update(&[0]);
    hasher.update(req.driver.as_str().as_bytes());
    for p in &req.passengers {
        hasher.update(&[0]);
        hasher.update(p.as_str().as_bytes());
    }
    hex::encode(hasher.finalize().as_bytes())
}

/// Sink for verified rewards. Token issuance itself lives behind this.
pub trait MintGateway {
    fn mint(&self, request: &MintRequest, now: LogicalTime) -> Result<(), RideError>;
}

impl<M: MintGateway + ?Sized> MintGateway for &M {
    fn mint(&self, request: &MintRequest, now: LogicalTime) -> Result<(), RideError> {
        (**self).mint(request, now)
    }
}

impl<M: MintGateway + ?Sized> MintGateway for std::sync::Arc<M> {
    fn mint(&self, request: &MintRequest, now: LogicalTime) -> Result<(), RideError> {
        (**self).mint(request, now)
    }
}

/// In-process gateway that records every request. Can be told to fail.
#[derive(Default, Debug)]
pub struct RecordingMint {
    minted: Mutex<Vec<MintRequest>>,
    fail_with: Mutex<Option<String>>,
}

impl RecordingMint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything minted so far, in order.
    pub fn minted(&self) -> Vec<MintRequest> {
        self.minted.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Make subsequent mints fail with `reason`; `None` restores success.
    pub fn set_failure(&self, reason: Option<String>) {
        if let Ok(mut f) = self.fail_with.lock() {
            *f = reason;
        }
    }
}

impl MintGateway for RecordingMint {
    fn mint(&self, request: &MintRequest, _now: LogicalTime) -> Result<(), RideError> {
        if let Some(reason) = self
            .fail_with
            .lock()
            .map_err(|_| RideError::MintFailed("mint recorder poisoned".into()))?
            .clone()
        {
            return Err(RideError::MintFailed(reason));
        }
        self.minted
            .lock()
            .map_err(|_| RideError::MintFailed("mint recorder poisoned".into()))?
            .push(request.clone());
        Ok(())
    }
}
