//! Prediction keys and the ledger that resolves them.
//!
//! A prediction key marks everything a client executed speculatively for
//! one action: effect applications, montage playback. The server resolves
//! each key exactly once. Confirmation makes the speculative state real;
//! rejection (and expiry, which is rejection with distinct bookkeeping)
//! queues the key's rollback actions, and the host drains that queue once
//! per update tick.

mod key;
mod ledger;

pub use key::{KeyResolution, PredictionKey};
pub use ledger::{PredictionLedger, RejectionEntry, RollbackAction};
