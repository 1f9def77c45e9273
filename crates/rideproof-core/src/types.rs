use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential trip identifier, assigned from zero and never reused.
pub type TripId = u64;

/// Logical time supplied by the host (block height or Unix seconds).
pub type LogicalTime = u64;

/// Reward amount in the token's base unit.
pub type Amount = u128;

/// Distance reported by the oracle, in the oracle's unit (metres, blocks of road, …).
pub type Distance = u64;

/// Congestion index reported by the oracle; valid values are 0..=100.
pub type CongestionIndex = u32;

// ── Identity ─────────────────────────────────────────────────────────────────

/// Opaque principal identifier (e.g. a Stacks-style `ST…` address).
///
/// Identities are only ever compared for equality; nothing in the core
/// interprets their contents.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub String);

impl Identity {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.0)
    }
}

// ── CallContext ──────────────────────────────────────────────────────────────

/// Execution context of a single engine call: who is calling and at what
/// logical time. Every engine operation receives one explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub caller: Identity,
    pub now: LogicalTime,
}

impl CallContext {
    pub fn new(caller: impl Into<Identity>, now: LogicalTime) -> Self {
        Self { caller: caller.into(), now }
    }
}
