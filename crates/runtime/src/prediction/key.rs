//! Prediction key type and resolution states.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{ConnectionId, Tick};

/// Token marking client-speculative state pending server confirmation.
///
/// Keys are issued monotonically per ledger and never reused; a stale key
/// resolves to nothing rather than to someone else's speculation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PredictionKey {
    pub id: u64,

    /// The client connection this key speculates for.
    pub connection: ConnectionId,

    /// Last tick at which the key may still be resolved. Past this, the
    /// ledger treats the key as rejected.
    pub expires_at: Tick,
}

impl PredictionKey {
    /// Whether this key can still tag new speculative work.
    #[inline]
    pub fn is_valid_for_prediction(&self, now: Tick) -> bool {
        now <= self.expires_at
    }
}

impl fmt::Display for PredictionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key:{}@{}", self.id, self.connection)
    }
}

/// Terminal resolution of a key. `Pending` is implicit in the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyResolution {
    /// Authoritative replay agreed with the client's speculative result.
    Confirmed,

    /// Authority disagreed; everything tagged with the key rolls back.
    Rejected,

    /// The validity window elapsed without resolution. Rolls back like a
    /// rejection but is recorded distinctly for diagnostics.
    Expired,
}

impl KeyResolution {
    /// Rejection and expiry share the rollback path.
    #[inline]
    pub const fn requires_rollback(self) -> bool {
        matches!(self, KeyResolution::Rejected | KeyResolution::Expired)
    }
}
