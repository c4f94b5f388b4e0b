//! Damage resolution: consuming the Damage meta attribute and detecting the
//! alive to dead transition.
//!
//! The pipeline itself runs inside [`CombatEngine`](crate::engine::CombatEngine)
//! as part of effect application; this module holds the pure planning step
//! and the outcome types handed to observers.

mod damage;
mod result;

pub use damage::{DamagePlan, plan_damage};
pub use result::{BountyGrant, DamageOutcome, DamageTaken, DeathTransition};
