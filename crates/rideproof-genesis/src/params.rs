use rideproof_core::constants::{DEFAULT_BASE_REWARD_RATE, DEFAULT_CONGESTION_MULTIPLIER, DEFAULT_MAX_TRIPS};
use rideproof_core::types::Identity;
use serde::{Deserialize, Serialize};

fn default_base_reward_rate() -> u64 { DEFAULT_BASE_REWARD_RATE }
fn default_congestion_multiplier() -> u64 { DEFAULT_CONGESTION_MULTIPLIER }
fn default_max_trips() -> u64 { DEFAULT_MAX_TRIPS }
fn default_true() -> bool { true }

/// Initial configuration written into a fresh store.
///
/// Only `admin` is required; `trusted_oracle` and `token_contract` default
/// to the admin identity, numeric parameters to the protocol defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisParams {
    pub admin: Identity,
    #[serde(default)]
    pub trusted_oracle: Option<Identity>,
    #[serde(default)]
    pub token_contract: Option<Identity>,
    #[serde(default = "default_base_reward_rate")]
    pub base_reward_rate: u64,
    #[serde(default = "default_congestion_multiplier")]
    pub congestion_multiplier: u64,
    #[serde(default = "default_max_trips")]
    pub max_trips: u64,
    #[serde(default = "default_true")]
    pub unique_confirmations: bool,
}

impl GenesisParams {
    pub fn new(admin: Identity) -> Self {
        Self {
            admin,
            trusted_oracle: None,
            token_contract: None,
            base_reward_rate: DEFAULT_BASE_REWARD_RATE,
            congestion_multiplier: DEFAULT_CONGESTION_MULTIPLIER,
            max_trips: DEFAULT_MAX_TRIPS,
            unique_confirmations: true,
        }
    }
}
