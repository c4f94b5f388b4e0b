//! Effect definitions, resolved specs, and the definition oracle.

use core::fmt;

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::attribute::AttributeKind;
use crate::character::CharacterId;
use crate::config::CombatConfig;

/// Identifies an effect definition in whatever registry the host wires up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectClassId(pub u32);

impl fmt::Display for EffectClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect:{}", self.0)
    }
}

/// Read-only lookup of effect definitions.
///
/// The engine never owns content; hosts provide definitions through this
/// trait and a missing definition surfaces as `InvalidEffectClass` at the
/// application site.
pub trait EffectOracle {
    fn definition(&self, class: EffectClassId) -> Option<&GameplayEffectDef>;
}

bitflags! {
    /// Dynamic tags carried by an effect spec.
    ///
    /// Tags travel with the spec into the damage pipeline, where e.g.
    /// HEADSHOT marks the damage record handed to observers. Serialization
    /// comes from the bitflags serde feature, enabled alongside ours.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct EffectTags: u8 {
        /// Damage originated from a headshot hit zone.
        const HEADSHOT = 1 << 0;
        /// Synthesized kill-reward effect from the damage pipeline.
        const BOUNTY = 1 << 1;
    }
}

/// How a modifier combines with the attribute's current value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModOp {
    /// current + magnitude
    Add,
    /// current * magnitude
    Multiply,
    /// current = magnitude
    Override,
}

/// One attribute change inside an effect.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifier {
    pub attribute: AttributeKind,
    pub op: ModOp,
    pub magnitude: f32,
}

impl Modifier {
    pub fn new(attribute: AttributeKind, op: ModOp, magnitude: f32) -> Self {
        Self {
            attribute,
            op,
            magnitude,
        }
    }

    pub fn add(attribute: AttributeKind, magnitude: f32) -> Self {
        Self::new(attribute, ModOp::Add, magnitude)
    }
}

/// Lifetime of an effect's modifiers.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DurationPolicy {
    /// Applied once, permanently folded into the base value.
    Instant,
    /// Active for a fixed number of seconds, then removed by the host.
    HasDuration(f32),
    /// Active until explicitly removed.
    Infinite,
}

/// Static description of a gameplay effect, resolved per application into a
/// [`GameplayEffectSpec`].
///
/// Definitions are content wired up by the host, not wire data, so they do
/// not serialize; the resolved spec does.
#[derive(Clone, Debug, PartialEq)]
pub struct GameplayEffectDef {
    pub name: &'static str,
    pub modifiers: ArrayVec<Modifier, { CombatConfig::MAX_EFFECT_MODIFIERS }>,
    pub duration: DurationPolicy,
    pub tags: EffectTags,
}

impl GameplayEffectDef {
    pub fn new(name: &'static str, duration: DurationPolicy) -> Self {
        Self {
            name,
            modifiers: ArrayVec::new(),
            duration,
            tags: EffectTags::empty(),
        }
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_tags(mut self, tags: EffectTags) -> Self {
        self.tags |= tags;
        self
    }

    /// Resolves this definition into an immutable spec.
    ///
    /// Magnitudes scale linearly with level; level 1.0 applies the
    /// definition verbatim.
    pub fn make_spec(&self, level: f32, context: EffectContext) -> GameplayEffectSpec {
        let mut modifiers = ArrayVec::new();
        for modifier in &self.modifiers {
            modifiers.push(Modifier {
                attribute: modifier.attribute,
                op: modifier.op,
                magnitude: match modifier.op {
                    // Scaling an Override or Multiply by level would change
                    // the op's meaning, so only additive magnitudes scale.
                    ModOp::Add => modifier.magnitude * level,
                    ModOp::Multiply | ModOp::Override => modifier.magnitude,
                },
            });
        }

        GameplayEffectSpec {
            context,
            modifiers,
            duration: self.duration,
            tags: self.tags,
        }
    }
}

/// Who is applying an effect and on whose behalf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectContext {
    /// The character whose action created the effect.
    pub source: CharacterId,
    /// The immediate causer when it differs from the source (a projectile's
    /// owner, a summon's master). Falls back to the source.
    pub causer: CharacterId,
}

impl EffectContext {
    pub fn new(source: CharacterId) -> Self {
        Self {
            source,
            causer: source,
        }
    }

    pub fn with_causer(mut self, causer: CharacterId) -> Self {
        self.causer = causer;
        self
    }
}

/// Fully-resolved, immutable description of one pending effect application.
///
/// Created from a [`GameplayEffectDef`], consumed once by
/// [`CombatEngine::apply_spec`](crate::engine::CombatEngine::apply_spec),
/// then discarded (Instant) or tracked as an active effect.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameplayEffectSpec {
    pub context: EffectContext,
    pub modifiers: ArrayVec<Modifier, { CombatConfig::MAX_EFFECT_MODIFIERS }>,
    pub duration: DurationPolicy,
    pub tags: EffectTags,
}
