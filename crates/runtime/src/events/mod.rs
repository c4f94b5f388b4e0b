//! Runtime events surfaced to hosts.
//!
//! Events are derived from committed state transitions; publishing is
//! best-effort and never blocks the update loop.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{AnimationEvent, CombatEvent, PredictionEvent};
