pub mod config;
pub mod constants;
pub mod error;
pub mod reward;
pub mod trip;
pub mod types;

pub use config::Configuration;
pub use constants::*;
pub use error::{ConfigParam, RideError};
pub use reward::compute_reward;
pub use trip::*;
pub use types::*;
