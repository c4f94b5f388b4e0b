//! Active (duration/infinite) effect instances.

use core::fmt;

use crate::attribute::AttributeKind;
use crate::character::CharacterId;
use crate::effect::{DurationPolicy, EffectTags};

/// Stable handle for an active effect instance.
///
/// Handles are allocated monotonically by the arena and never reused, so a
/// handle kept across a rollback resolves to nothing instead of to a
/// different effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEffectHandle(pub u64);

impl fmt::Display for ActiveEffectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "active:{}", self.0)
    }
}

/// A duration or infinite effect currently modifying a character.
///
/// `applied` records the effective per-attribute delta that landed after
/// policy validation, which is what removal must subtract. The planned
/// magnitude is not enough: a clamped write applies less than it asked for.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEffect {
    pub handle: ActiveEffectHandle,
    pub target: CharacterId,
    pub source: CharacterId,
    pub duration: DurationPolicy,
    pub tags: EffectTags,
    /// Effective deltas applied to the target's current values.
    pub applied: Vec<(AttributeKind, f32)>,
}
