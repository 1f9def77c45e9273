use std::sync::{Mutex, MutexGuard};

use rideproof_core::config::Configuration;
use rideproof_core::constants::{
    MAX_CONGESTION_INDEX, MAX_DISPUTE_REASON_BYTES, MAX_PASSENGERS, MAX_ROUTE_BYTES, MIN_PASSENGERS,
};
use rideproof_core::error::RideError;
use rideproof_core::reward::compute_reward;
use rideproof_core::trip::{OracleSubmission, Trip, TripStatus};
use rideproof_core::types::{
    Amount, CallContext, CongestionIndex, Distance, Identity, LogicalTime, TripId,
};
use tracing::{debug, info};

use crate::mint::{MintGateway, MintRequest};
use crate::store::TripStore;

// ── Engine state ──────────────────────────────────────────────────────────────

/// Store plus the cached configuration it holds. Guarded as one unit so a
/// single operation always sees a consistent configuration.
struct EngineState<S> {
    store: S,
    config: Configuration,
}

// ── TripEngine ────────────────────────────────────────────────────────────────

/// The trip lifecycle engine.
///
/// Every operation takes the caller and logical time explicitly, runs all
/// of its checks against a snapshot, and only then writes. A failed call
/// leaves the store untouched. Calls are serialized through one lock.
pub struct TripEngine<S: TripStore, M: MintGateway> {
    state: Mutex<EngineState<S>>,
    mint: M,
}

impl<S: TripStore, M: MintGateway> TripEngine<S, M> {
    /// Open an engine over a store that already holds a configuration
    /// (see `rideproof-genesis`).
    pub fn open(store: S, mint: M) -> Result<Self, RideError> {
        let config = store
            .get_config()?
            .ok_or_else(|| RideError::Storage("no configuration found; apply genesis first".into()))?;
        Ok(Self { state: Mutex::new(EngineState { store, config }), mint })
    }

    /// Create an engine over an empty store and persist `config` into it.
    /// A store that already holds a configuration or trips is refused;
    /// reopen it with `open` instead.
    pub fn new(mut store: S, config: Configuration, mint: M) -> Result<Self, RideError> {
        if store.get_config()?.is_some() || store.trip_exists(0) {
            return Err(RideError::Storage("store already initialised; use open".into()));
        }
        store.put_config(&config)?;
        Ok(Self { state: Mutex::new(EngineState { store, config }), mint })
    }

    fn lock(&self) -> Result<MutexGuard<'_, EngineState<S>>, RideError> {
        self.state
            .lock()
            .map_err(|_| RideError::Storage("engine state lock poisoned".into()))
    }

    // ── Configuration registry ────────────────────────────────────────────────

    /// Snapshot of the configuration currently in effect.
    pub fn config(&self) -> Result<Configuration, RideError> {
        Ok(self.lock()?.config.clone())
    }

    fn update_config<F>(&self, ctx: &CallContext, op: &'static str, f: F) -> Result<(), RideError>
    where
        F: FnOnce(&mut Configuration, &Identity) -> Result<(), RideError>,
    {
        let mut st = self.lock()?;
        let mut next = st.config.clone();
        rejected(op, ctx, f(&mut next, &ctx.caller))?;
        st.store.put_config(&next)?;
        st.config = next;
        info!(caller = %ctx.caller, op, "configuration updated");
        Ok(())
    }

    pub fn set_trusted_oracle(&self, ctx: &CallContext, oracle: Identity) -> Result<(), RideError> {
        self.update_config(ctx, "set_trusted_oracle", |c, caller| c.set_trusted_oracle(caller, oracle))
    }

    pub fn set_token_contract(&self, ctx: &CallContext, contract: Identity) -> Result<(), RideError> {
        self.update_config(ctx, "set_token_contract", |c, caller| c.set_token_contract(caller, contract))
    }

    pub fn set_base_reward_rate(&self, ctx: &CallContext, rate: u64) -> Result<(), RideError> {
        self.update_config(ctx, "set_base_reward_rate", |c, caller| c.set_base_reward_rate(caller, rate))
    }

    pub fn set_congestion_multiplier(&self, ctx: &CallContext, multiplier: u64) -> Result<(), RideError> {
        self.update_config(ctx, "set_congestion_multiplier", |c, caller| {
            c.set_congestion_multiplier(caller, multiplier)
        })
    }

    pub fn set_max_trips(&self, ctx: &CallContext, max_trips: u64) -> Result<(), RideError> {
        self.update_config(ctx, "set_max_trips", |c, caller| c.set_max_trips(caller, max_trips))
    }

    // ── initiate_trip ─────────────────────────────────────────────────────────

    /// Propose a new trip. Returns its id, which equals the prior trip count.
    pub fn initiate_trip(
        &self,
        ctx: &CallContext,
        driver: Identity,
        passengers: Vec<Identity>,
        route: String,
        start_time: LogicalTime,
    ) -> Result<TripId, RideError> {
        let mut st = self.lock()?;
        let config = &st.config;

        let checked = (|| -> Result<(), RideError> {
            if config.next_trip_id >= config.max_trips {
                return Err(RideError::MaxTripsExceeded { max: config.max_trips });
            }
            if driver == ctx.caller {
                return Err(RideError::InvalidDriver);
            }
            if !(MIN_PASSENGERS..=MAX_PASSENGERS).contains(&passengers.len()) {
                return Err(RideError::InvalidPassengers {
                    min: MIN_PASSENGERS,
                    max: MAX_PASSENGERS,
                    got: passengers.len(),
                });
            }
            if route.is_empty() || route.len() > MAX_ROUTE_BYTES {
                return Err(RideError::InvalidRoute { max: MAX_ROUTE_BYTES });
            }
            if start_time < ctx.now {
                return Err(RideError::InvalidTimestamp { got: start_time, now: ctx.now });
            }
            Ok(())
        })();
        rejected("initiate_trip", ctx, checked)?;

        let id = config.next_trip_id;
        let trip = Trip::new(id, driver, passengers, route, start_time, ctx.now);
        let mut next = config.clone();
        next.next_trip_id += 1;

        st.store.put_trip_and_config(&trip, &next)?;
        st.config = next;

        info!(trip_id = id, caller = %ctx.caller, driver = %trip.driver,
              passengers = trip.passengers.len(), "trip initiated");
        Ok(id)
    }

    // ── submit_oracle_data ────────────────────────────────────────────────────

    /// Record the trusted oracle's attestation for a pending trip. A later
    /// submission overwrites an earlier one.
    pub fn submit_oracle_data(
        &self,
        ctx: &CallContext,
        trip_id: TripId,
        gps_valid: bool,
        distance: Distance,
        congestion: CongestionIndex,
        end_time: LogicalTime,
    ) -> Result<(), RideError> {
        let mut st = self.lock()?;

        let checked = (|| -> Result<Trip, RideError> {
            let mut trip = st.store.get_trip(trip_id)?.ok_or(RideError::TripNotFound(trip_id))?;
            if ctx.caller != st.config.trusted_oracle {
                return Err(RideError::OracleNotTrusted);
            }
            if !gps_valid {
                return Err(RideError::InvalidGpsData);
            }
            if distance == 0 {
                return Err(RideError::InvalidDistance);
            }
            if congestion > MAX_CONGESTION_INDEX {
                return Err(RideError::InvalidCongestion { max: MAX_CONGESTION_INDEX, got: congestion });
            }
            if end_time < ctx.now {
                return Err(RideError::InvalidTimestamp { got: end_time, now: ctx.now });
            }
            if trip.status.is_terminal() {
                return Err(RideError::InvalidStatus);
            }
            trip.end_time = end_time;
            trip.distance = distance;
            trip.congestion_index = congestion;
            trip.gps_verified = gps_valid;
            Ok(trip)
        })();
        let trip = rejected("submit_oracle_data", ctx, checked)?;

        let submission = OracleSubmission {
            trip_id,
            oracle: ctx.caller.clone(),
            gps_valid,
            distance,
            congestion,
            submitted_at: ctx.now,
        };
        st.store.put_submission(&submission)?;
        st.store.put_trip(&trip)?;

        info!(trip_id, distance, congestion, end_time, "oracle data recorded");
        Ok(())
    }

    // ── confirm_trip ──────────────────────────────────────────────────────────

    /// A participant attests that the trip took place. Returns the new
    /// confirmation count.
    pub fn confirm_trip(&self, ctx: &CallContext, trip_id: TripId) -> Result<u32, RideError> {
        let mut st = self.lock()?;

        let checked = (|| -> Result<Trip, RideError> {
            let mut trip = st.store.get_trip(trip_id)?.ok_or(RideError::TripNotFound(trip_id))?;
            if !trip.is_participant(&ctx.caller) {
                return Err(RideError::NotAuthorized);
            }
            if trip.status.is_terminal() {
                return Err(RideError::InvalidStatus);
            }
            if !trip.gps_verified {
                return Err(RideError::InvalidGpsData);
            }
            if st.config.unique_confirmations && trip.has_confirmed(&ctx.caller) {
                return Err(RideError::AlreadyConfirmed);
            }
            trip.confirmations += 1;
            trip.confirmed_by.push(ctx.caller.clone());
            Ok(trip)
        })();
        let trip = rejected("confirm_trip", ctx, checked)?;

        st.store.put_trip(&trip)?;
        info!(trip_id, caller = %ctx.caller, confirmations = trip.confirmations,
              quorum = trip.quorum_required(), "trip confirmed");
        Ok(trip.confirmations)
    }

    // ── verify_trip ───────────────────────────────────────────────────────────

    /// Driver finalizes a confirmed trip: computes the reward, mints it
    /// once, and marks the trip verified. Returns the reward.
    pub fn verify_trip(&self, ctx: &CallContext, trip_id: TripId) -> Result<Amount, RideError> {
        let mut st = self.lock()?;

        let checked = (|| -> Result<(Trip, Amount), RideError> {
            let trip = st.store.get_trip(trip_id)?.ok_or(RideError::TripNotFound(trip_id))?;
            if ctx.caller != trip.driver {
                return Err(RideError::NotAuthorized);
            }
            if !trip.quorum_met() {
                return Err(RideError::InvalidConfirmations {
                    need: trip.quorum_required(),
                    got: trip.confirmations,
                });
            }
            if trip.disputed {
                return Err(RideError::DisputeAlreadyRaised);
            }
            if trip.status == TripStatus::Verified {
                return Err(RideError::TripAlreadyVerified);
            }
            let reward = reward_for(&st.config, trip.distance, trip.passenger_count(), trip.congestion_index)?;
            Ok((trip, reward))
        })();
        let (mut trip, reward) = rejected("verify_trip", ctx, checked)?;

        let request = MintRequest {
            token_contract: st.config.token_contract.clone(),
            trip_id,
            amount: reward,
            driver: trip.driver.clone(),
            passengers: trip.passengers.clone(),
        };
        rejected("verify_trip", ctx, self.mint.mint(&request, ctx.now))?;

        trip.status = TripStatus::Verified;
        trip.reward = reward;
        trip.timestamp = ctx.now;
        st.store.put_trip(&trip)?;

        info!(trip_id, driver = %trip.driver, reward, "trip verified, reward minted");
        Ok(reward)
    }

    // ── compute_reward ────────────────────────────────────────────────────────

    /// Reward under the configuration currently in effect. Pure.
    pub fn compute_reward(
        &self,
        distance: Distance,
        passenger_count: usize,
        congestion: CongestionIndex,
    ) -> Result<Amount, RideError> {
        let st = self.lock()?;
        reward_for(&st.config, distance, passenger_count, congestion)
    }

    // ── dispute_trip ──────────────────────────────────────────────────────────

    /// A participant halts a pending trip. Terminal.
    pub fn dispute_trip(&self, ctx: &CallContext, trip_id: TripId, reason: String) -> Result<(), RideError> {
        let mut st = self.lock()?;

        let checked = (|| -> Result<Trip, RideError> {
            let mut trip = st.store.get_trip(trip_id)?.ok_or(RideError::TripNotFound(trip_id))?;
            if reason.is_empty() || reason.len() > MAX_DISPUTE_REASON_BYTES {
                return Err(RideError::InvalidDisputeReason { max: MAX_DISPUTE_REASON_BYTES });
            }
            if !trip.is_participant(&ctx.caller) {
                return Err(RideError::NotAuthorized);
            }
            if trip.disputed {
                return Err(RideError::DisputeAlreadyRaised);
            }
            if trip.status.is_terminal() {
                return Err(RideError::InvalidStatus);
            }
            trip.disputed = true;
            trip.dispute_reason = reason;
            trip.status = TripStatus::Disputed;
            Ok(trip)
        })();
        let trip = rejected("dispute_trip", ctx, checked)?;

        st.store.put_trip(&trip)?;
        info!(trip_id, caller = %ctx.caller, reason = %trip.dispute_reason, "trip disputed");
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn get_trip(&self, trip_id: TripId) -> Result<Option<Trip>, RideError> {
        self.lock()?.store.get_trip(trip_id)
    }

    pub fn get_oracle_submission(&self, trip_id: TripId) -> Result<Option<OracleSubmission>, RideError> {
        self.lock()?.store.get_submission(trip_id)
    }

    pub fn get_trip_count(&self) -> Result<u64, RideError> {
        Ok(self.lock()?.config.trip_count())
    }

    /// Run a read-only closure against the store under the engine lock.
    pub fn with_store<R>(&self, f: impl FnOnce(&S) -> R) -> Result<R, RideError> {
        Ok(f(&self.lock()?.store))
    }
}

fn reward_for(
    config: &Configuration,
    distance: Distance,
    passenger_count: usize,
    congestion: CongestionIndex,
) -> Result<Amount, RideError> {
    match compute_reward(
        distance,
        passenger_count,
        congestion,
        config.base_reward_rate,
        config.congestion_multiplier,
    ) {
        Some(r) if r > 0 => Ok(r),
        _ => Err(RideError::InvalidReward),
    }
}

/// Log a rejected call at debug level and pass the result through.
fn rejected<T>(op: &'static str, ctx: &CallContext, r: Result<T, RideError>) -> Result<T, RideError> {
    if let Err(e) = &r {
        debug!(op, caller = %ctx.caller, code = e.code(), error = %e, "call rejected");
    }
    r
}
