//! Undo journals for speculative effect applications.
//!
//! Every attribute write performed while applying a spec is recorded with
//! its pre-write record, including cascaded writes (max rescale, damage
//! resolution, bounty payout). Reverting a journal restores the arena to
//! the byte-exact state it had before the application, which is what the
//! prediction ledger needs when the server rejects a key.

use crate::attribute::{Attribute, AttributeKind};
use crate::character::CharacterId;
use crate::effect::ActiveEffectHandle;

/// One attribute record as it was before a write.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeWrite {
    pub character: CharacterId,
    pub attribute: AttributeKind,
    pub previous: Attribute,
}

/// Ordered record of everything one effect application changed.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectJournal {
    /// Writes in application order; revert walks them in reverse.
    pub writes: Vec<AttributeWrite>,

    /// Active-effect instances created under this application.
    pub activated: Vec<(CharacterId, ActiveEffectHandle)>,
}

impl EffectJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.activated.is_empty()
    }

    pub(crate) fn record_write(
        &mut self,
        character: CharacterId,
        attribute: AttributeKind,
        previous: Attribute,
    ) {
        self.writes.push(AttributeWrite {
            character,
            attribute,
            previous,
        });
    }

    pub(crate) fn record_activation(
        &mut self,
        character: CharacterId,
        handle: ActiveEffectHandle,
    ) {
        self.activated.push((character, handle));
    }
}
