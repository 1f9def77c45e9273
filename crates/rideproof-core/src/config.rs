//! Configuration registry.
//!
//! The mutable protocol parameters plus the trip counter. All setters are
//! gated on the admin identity, which itself is fixed at genesis.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BASE_REWARD_RATE, DEFAULT_CONGESTION_MULTIPLIER, DEFAULT_MAX_TRIPS};
use crate::error::{ConfigParam, RideError};
use crate::types::{Identity, TripId};

fn default_true() -> bool { true }

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Owner of every privileged operation. Never changes.
    pub admin: Identity,
    /// The only identity allowed to submit oracle attestations.
    pub trusted_oracle: Identity,
    /// Opaque reference handed to the mint gateway.
    pub token_contract: Identity,
    pub base_reward_rate: u64,
    pub congestion_multiplier: u64,
    /// Ceiling on trips ever created.
    pub max_trips: u64,
    /// Id assigned to the next trip; equals the number of trips created.
    pub next_trip_id: TripId,
    /// Reject a second confirmation from the same identity.
    #[serde(default = "default_true")]
    pub unique_confirmations: bool,
}

impl Configuration {
    /// Configuration with the protocol defaults and every role held by `admin`.
    pub fn new(admin: Identity) -> Self {
        Self {
            trusted_oracle: admin.clone(),
            token_contract: admin.clone(),
            admin,
            base_reward_rate: DEFAULT_BASE_REWARD_RATE,
            congestion_multiplier: DEFAULT_CONGESTION_MULTIPLIER,
            max_trips: DEFAULT_MAX_TRIPS,
            next_trip_id: 0,
            unique_confirmations: true,
        }
    }

    pub fn trip_count(&self) -> u64 {
        self.next_trip_id
    }

    pub fn is_admin(&self, who: &Identity) -> bool {
        self.admin == *who
    }

    fn ensure_admin(&self, caller: &Identity) -> Result<(), RideError> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            Err(RideError::NotAuthorized)
        }
    }

    pub fn set_trusted_oracle(&mut self, caller: &Identity, oracle: Identity) -> Result<(), RideError> {
        self.ensure_admin(caller)?;
        self.trusted_oracle = oracle;
        Ok(())
    }

    pub fn set_token_contract(&mut self, caller: &Identity, contract: Identity) -> Result<(), RideError> {
        self.ensure_admin(caller)?;
        self.token_contract = contract;
        Ok(())
    }

    pub fn set_base_reward_rate(&mut self, caller: &Identity, rate: u64) -> Result<(), RideError> {
        self.ensure_admin(caller)?;
        if rate == 0 {
            return Err(RideError::InvalidParameter(ConfigParam::BaseRewardRate));
        }
        self.base_reward_rate = rate;
        Ok(())
    }

    pub fn set_congestion_multiplier(&mut self, caller: &Identity, multiplier: u64) -> Result<(), RideError> {
        self.ensure_admin(caller)?;
        if multiplier == 0 {
            return Err(RideError::InvalidParameter(ConfigParam::CongestionMultiplier));
        }
        self.congestion_multiplier = multiplier;
        Ok(())
    }

    /// Raise (or lower) the trip ceiling. Cannot drop below trips already created.
    pub fn set_max_trips(&mut self, caller: &Identity, max_trips: u64) -> Result<(), RideError> {
        self.ensure_admin(caller)?;
        if max_trips == 0 || max_trips < self.next_trip_id {
            return Err(RideError::InvalidParameter(ConfigParam::MaxTrips));
        }
        self.max_trips = max_trips;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

    fn cfg() -> Configuration {
        Configuration::new(Identity::from(ADMIN))
    }

    #[test]
    fn defaults_match_deployment() {
        let c = cfg();
        assert_eq!(c.base_reward_rate, 10);
        assert_eq!(c.congestion_multiplier, 2);
        assert_eq!(c.max_trips, 100_000);
        assert_eq!(c.trip_count(), 0);
        assert_eq!(c.trusted_oracle, Identity::from(ADMIN));
        assert!(c.unique_confirmations);
    }

    #[test]
    fn admin_sets_base_reward_rate() {
        let mut c = cfg();
        c.set_base_reward_rate(&ADMIN.into(), 20).unwrap();
        assert_eq!(c.base_reward_rate, 20);
    }

    #[test]
    fn non_admin_rejected_without_change() {
        let mut c = cfg();
        let fake = Identity::from("ST5FAKE");
        assert_eq!(c.set_base_reward_rate(&fake, 20), Err(RideError::NotAuthorized));
        assert_eq!(c.set_congestion_multiplier(&fake, 3), Err(RideError::NotAuthorized));
        assert_eq!(c.set_trusted_oracle(&fake, fake.clone()), Err(RideError::NotAuthorized));
        assert_eq!(c.set_token_contract(&fake, fake.clone()), Err(RideError::NotAuthorized));
        assert_eq!(c, cfg());
    }

    #[test]
    fn non_admin_checked_before_value() {
        let mut c = cfg();
        assert_eq!(c.set_base_reward_rate(&"ST5FAKE".into(), 0), Err(RideError::NotAuthorized));
    }

    #[test]
    fn zero_rate_and_multiplier_rejected() {
        let mut c = cfg();
        let admin = Identity::from(ADMIN);
        assert_eq!(
            c.set_base_reward_rate(&admin, 0),
            Err(RideError::InvalidParameter(ConfigParam::BaseRewardRate))
        );
        assert_eq!(
            c.set_congestion_multiplier(&admin, 0),
            Err(RideError::InvalidParameter(ConfigParam::CongestionMultiplier))
        );
        assert_eq!(c, cfg());
    }

    #[test]
    fn max_trips_cannot_drop_below_count() {
        let mut c = cfg();
        let admin = Identity::from(ADMIN);
        c.next_trip_id = 5;
        assert!(c.set_max_trips(&admin, 4).is_err());
        assert!(c.set_max_trips(&admin, 0).is_err());
        c.set_max_trips(&admin, 5).unwrap();
        assert_eq!(c.max_trips, 5);
    }

    #[test]
    fn missing_unique_flag_defaults_on() {
        let json = format!(
            r#"{{"admin":"{a}","trusted_oracle":"{a}","token_contract":"{a}",
                "base_reward_rate":10,"congestion_multiplier":2,"max_trips":3,"next_trip_id":0}}"#,
            a = ADMIN
        );
        let c: Configuration = serde_json::from_str(&json).unwrap();
        assert!(c.unique_confirmations);
    }
}
