/// ─── RideProof Protocol Constants ───────────────────────────────────────────

// ── Trip shape ───────────────────────────────────────────────────────────────

/// Minimum number of passengers on a trip.
pub const MIN_PASSENGERS: usize = 1;

/// Maximum number of passengers on a trip.
pub const MAX_PASSENGERS: usize = 10;

/// Maximum route description length (bytes).
pub const MAX_ROUTE_BYTES: usize = 256;

/// Maximum dispute reason length (bytes).
pub const MAX_DISPUTE_REASON_BYTES: usize = 512;

/// Upper bound (inclusive) of the oracle congestion index.
pub const MAX_CONGESTION_INDEX: u32 = 100;

/// Congestion index is a percentage; the bonus divides by this once.
pub const CONGESTION_SCALE: u128 = 100;

// ── Default configuration ────────────────────────────────────────────────────

/// Reward per unit of distance per passenger.
pub const DEFAULT_BASE_REWARD_RATE: u64 = 10;

/// Weight of the congestion bonus.
pub const DEFAULT_CONGESTION_MULTIPLIER: u64 = 2;

/// Total trips that may ever be created before the admin raises the ceiling.
pub const DEFAULT_MAX_TRIPS: u64 = 100_000;
