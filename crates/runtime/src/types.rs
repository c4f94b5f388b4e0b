//! Shared runtime identifiers and the actor-mode taxonomy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discrete time unit on the update timeline.
///
/// The runtime never reads a wall clock; hosts advance ticks as network
/// updates are delivered, which keeps replay deterministic.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies the client connection a prediction key belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub u32);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}

/// Which view of a character this process holds.
///
/// Every externally visible mutation is attributable to exactly one mode;
/// rollback and reconciliation use it to decide which state to touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetRole {
    /// The server-authoritative timeline.
    Authority,

    /// The owning client, allowed to execute speculatively under
    /// prediction keys.
    Predicting,

    /// A remote observer that neither owns nor predicts, only replays
    /// authoritative broadcasts.
    Simulated,
}

impl NetRole {
    #[inline]
    pub const fn has_authority(self) -> bool {
        matches!(self, NetRole::Authority)
    }

    #[inline]
    pub const fn can_predict(self) -> bool {
        matches!(self, NetRole::Predicting)
    }

    #[inline]
    pub const fn is_simulated(self) -> bool {
        matches!(self, NetRole::Simulated)
    }
}
