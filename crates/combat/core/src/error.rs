//! Effect application errors.
//!
//! Only genuine application failures are errors. Attribute clamping, the
//! ratio-preserving rescale on max changes, and the death-transition guards
//! are policy and never surface here.

use crate::character::CharacterId;
use crate::effect::{ActiveEffectHandle, EffectClassId};

/// Errors that can occur while applying or removing gameplay effects.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectError {
    /// No effect definition was supplied (or the class id resolved to none).
    #[error("Invalid effect class {0}")]
    InvalidEffectClass(EffectClassId),

    /// A direct-to-target application was given no usable target.
    #[error("Invalid target")]
    InvalidTarget,

    /// Target character does not exist in the arena.
    #[error("Character {0} not found")]
    CharacterNotFound(CharacterId),

    /// The active-effect handle does not refer to a live effect.
    #[error("Effect {0} is not active")]
    EffectNotActive(ActiveEffectHandle),
}
