//! Gameplay effects: bundles of attribute modifiers with a duration policy.
//!
//! An effect definition is static content; a spec is that definition fully
//! resolved against a level and a source context, immutable and consumed
//! exactly once. Instant specs are discarded after application; duration
//! specs become [`ActiveEffect`] instances tracked on the target so they can
//! be removed (or rolled back wholesale when a prediction is rejected).

mod active;
mod journal;
mod spec;

pub use active::{ActiveEffect, ActiveEffectHandle};
pub use journal::{AttributeWrite, EffectJournal};
pub use spec::{
    DurationPolicy, EffectClassId, EffectContext, EffectOracle, EffectTags, GameplayEffectDef,
    GameplayEffectSpec, ModOp, Modifier,
};
