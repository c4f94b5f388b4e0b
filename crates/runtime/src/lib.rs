//! Authority/replica synchronization over the `combat-core` rules.
//!
//! The runtime owns everything that distinguishes the three views of a
//! character: the server-authoritative timeline, the predicting client that
//! executes speculatively under prediction keys, and simulated proxies that
//! only replay authoritative broadcasts. It provides:
//!
//! - the [`PredictionLedger`] issuing and resolving prediction keys, with an
//!   explicit rejection queue drained once per update tick;
//! - the per-mesh [`MontageTable`] tracking locally-playing montages and
//!   reconciling simulated playback against client-reported positions;
//! - the [`EffectApplicator`], the prediction-aware entry point for applying
//!   gameplay effects to self or to a target;
//! - the ability lifecycle ([`AbilitySystem`]) that clears animation
//!   ownership when abilities end;
//! - a topic-based [`EventBus`] surfacing combat, prediction, and animation
//!   events to hosts.
//!
//! Transport and serialization formats stay outside; this crate only
//! implements the state transitions their deliveries trigger.

pub mod ability;
pub mod animation;
pub mod effects;
pub mod error;
pub mod events;
pub mod prediction;
pub mod targeting;
pub mod types;
pub mod world;

pub use ability::{AbilityBehavior, AbilityContext, AbilityId, AbilitySystem, JumpAbility};
pub use animation::{
    AnimInstance, MeshId, Montage, MontageHandle, MontageLibrary, MontageOracle, MontageSection,
    MontageTable, ReplicatedMontageState, MONTAGE_PREDICTION_REJECT_FADETIME,
    REPLAY_ERROR_THRESHOLD,
};
pub use effects::{AppliedEffect, EffectApplicator, EffectRegistry};
pub use error::RuntimeError;
pub use events::{AnimationEvent, CombatEvent, Event, EventBus, PredictionEvent, Topic};
pub use prediction::{
    KeyResolution, PredictionKey, PredictionLedger, RejectionEntry, RollbackAction,
};
pub use targeting::{EffectContainerSpec, EventData, ResolveTargets, TargetDescriptor, TargetResolver};
pub use types::{ConnectionId, NetRole, Tick};
pub use world::{CharacterSync, World};
