//! Outcome records produced by the damage resolution pipeline.

use crate::character::CharacterId;

/// A committed damage application, reported to observers.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageTaken {
    pub target: CharacterId,
    /// The causer from the effect context; equals the target on self damage.
    pub source: CharacterId,
    /// Damage consumed from the meta attribute, before the health clamp.
    pub amount: f32,
    /// The spec carried the headshot tag.
    pub headshot: bool,
}

/// The one-per-life alive to dead transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeathTransition {
    pub character: CharacterId,
    /// Absent on self-inflicted or unowned deaths.
    pub killer: Option<CharacterId>,
}

/// Kill reward paid to the damage source's owner.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BountyGrant {
    pub receiver: CharacterId,
    pub experience: f32,
    pub gold: f32,
}

/// Everything one Damage consumption produced.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageOutcome {
    pub taken: DamageTaken,
    pub death: Option<DeathTransition>,
    pub bounty: Option<BountyGrant>,
}
