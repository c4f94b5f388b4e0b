//! Deterministic stat-and-effect rules shared by the authority and replicas.
//!
//! `combat-core` defines the canonical attribute schema, the change policy
//! that validates every write, the damage resolution pipeline, and the
//! gameplay-effect application machinery. All state mutation flows through
//! [`engine::CombatEngine`]; the synchronization runtime and offline tools
//! depend on the types re-exported here.
//!
//! The crate is synchronous and free of I/O so the same application can be
//! replayed speculatively on a predicting client and authoritatively on the
//! server with bit-identical results (see [`digest::state_digest`]).

pub mod attribute;
pub mod character;
pub mod combat;
pub mod config;
pub mod digest;
pub mod effect;
pub mod engine;
pub mod error;

pub use attribute::{Attribute, AttributeKind, AttributeStore, ChangePolicy};
pub use character::{CharacterArena, CharacterId, CharacterState};
pub use combat::{BountyGrant, DamageOutcome, DamageTaken, DeathTransition};
pub use config::CombatConfig;
pub use digest::state_digest;
pub use effect::{
    ActiveEffect, ActiveEffectHandle, AttributeWrite, DurationPolicy, EffectClassId,
    EffectContext, EffectJournal, EffectOracle, EffectTags, GameplayEffectDef,
    GameplayEffectSpec, ModOp, Modifier,
};
pub use engine::{CombatEngine, EffectOutcome};
pub use error::EffectError;
