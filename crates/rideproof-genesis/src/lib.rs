//! rideproof-genesis
//!
//! Seeds a fresh store with its configuration. This is the only place the
//! admin identity is chosen; nothing afterwards can change it.

pub mod params;

pub use params::GenesisParams;

use rideproof_core::config::Configuration;
use rideproof_core::error::{ConfigParam, RideError};
use rideproof_state::TripStore;
use tracing::info;

/// Build the genesis configuration from `params`, validating every
/// numeric parameter.
pub fn genesis_config(params: &GenesisParams) -> Result<Configuration, RideError> {
    if params.base_reward_rate == 0 {
        return Err(RideError::InvalidParameter(ConfigParam::BaseRewardRate));
    }
    if params.congestion_multiplier == 0 {
        return Err(RideError::InvalidParameter(ConfigParam::CongestionMultiplier));
    }
    if params.max_trips == 0 {
        return Err(RideError::InvalidParameter(ConfigParam::MaxTrips));
    }

    let mut config = Configuration::new(params.admin.clone());
    if let Some(o) = &params.trusted_oracle {
        config.trusted_oracle = o.clone();
    }
    if let Some(t) = &params.token_contract {
        config.token_contract = t.clone();
    }
    config.base_reward_rate = params.base_reward_rate;
    config.congestion_multiplier = params.congestion_multiplier;
    config.max_trips = params.max_trips;
    config.unique_confirmations = params.unique_confirmations;
    Ok(config)
}

/// Apply genesis to an empty store. Fails if a configuration already exists.
pub fn apply_genesis<S: TripStore>(store: &mut S, params: &GenesisParams) -> Result<Configuration, RideError> {
    if store.get_config()?.is_some() {
        return Err(RideError::Storage("genesis already applied".into()));
    }
    let config = genesis_config(params)?;
    store.put_config(&config)?;
    info!(
        admin = %config.admin,
        oracle = %config.trusted_oracle,
        rate = config.base_reward_rate,
        multiplier = config.congestion_multiplier,
        max_trips = config.max_trips,
        "applied RideProof genesis"
    );
    Ok(config)
}
