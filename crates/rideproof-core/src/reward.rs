//! Deterministic reward arithmetic.
//!
//!   base  = distance × passengers × base_rate
//!   bonus = base × congestion × multiplier / 100
//!   reward = base + bonus
//!
//! Integer arithmetic throughout. The congestion percentage is applied
//! with a single floor division after all multiplications, so the only
//! rounding is the truncation of `bonus`.

use crate::constants::CONGESTION_SCALE;
use crate::types::{Amount, CongestionIndex, Distance};

/// Compute the reward for a trip. Returns `None` on overflow.
pub fn compute_reward(
    distance: Distance,
    passenger_count: usize,
    congestion_index: CongestionIndex,
    base_reward_rate: u64,
    congestion_multiplier: u64,
) -> Option<Amount> {
    let base = (distance as u128)
        .checked_mul(passenger_count as u128)?
        .checked_mul(base_reward_rate as u128)?;
    let bonus = base
        .checked_mul(congestion_index as u128)?
        .checked_mul(congestion_multiplier as u128)?
        / CONGESTION_SCALE;
    base.checked_add(bonus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_passenger_example() {
        // 50·1·10 = 500; 500·0.8·2 = 800
        assert_eq!(compute_reward(50, 1, 80, 10, 2), Some(1300));
    }

    #[test]
    fn three_passengers_half_congestion() {
        // 100·3·10 = 3000; 3000·0.5·2 = 3000
        assert_eq!(compute_reward(100, 3, 50, 10, 2), Some(6000));
    }

    #[test]
    fn zero_congestion_is_base_only() {
        assert_eq!(compute_reward(7, 2, 0, 10, 2), Some(140));
    }

    #[test]
    fn bonus_truncates_once() {
        // base = 1; bonus = 1·33·1/100 = 0.33 → 0
        assert_eq!(compute_reward(1, 1, 33, 1, 1), Some(1));
        // base = 3; bonus = 99/100 → 0
        assert_eq!(compute_reward(3, 1, 33, 1, 1), Some(3));
        // base = 4; bonus = 132/100 → 1
        assert_eq!(compute_reward(4, 1, 33, 1, 1), Some(5));
    }

    #[test]
    fn zero_distance_gives_zero() {
        assert_eq!(compute_reward(0, 4, 100, 10, 2), Some(0));
    }

    #[test]
    fn overflow_is_none() {
        assert_eq!(compute_reward(u64::MAX, 10, 100, u64::MAX, u64::MAX), None);
    }
}
