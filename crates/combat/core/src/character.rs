//! Character records and the arena that owns them.
//!
//! Characters are arena-owned and referenced by stable integer handles.
//! Nothing in this crate or the runtime holds a raw reference to a
//! character across updates; lookups go through [`CharacterArena`].

use std::fmt;

use crate::attribute::AttributeStore;
use crate::effect::{ActiveEffect, ActiveEffectHandle};

/// Stable handle for a character tracked in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterId(pub u32);

impl CharacterId {
    /// Reserved identifier for system-initiated effect applications
    /// (startup effects, environment damage, bounty payouts with no owner).
    pub const SYSTEM: Self = Self(u32::MAX);

    /// Returns true if this handle represents the system actor.
    #[inline]
    pub const fn is_system(self) -> bool {
        self.0 == Self::SYSTEM.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-character combat state.
///
/// The attribute store is the only mutable part; the bounty fields are
/// configured at spawn and read by the damage pipeline when this character
/// dies.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterState {
    pub id: CharacterId,
    pub attributes: AttributeStore,

    /// Duration and infinite effects currently modifying this character.
    pub active_effects: Vec<ActiveEffect>,

    /// Experience paid to the killer when this character dies.
    pub experience_bounty: f32,

    /// Gold paid to the killer when this character dies.
    pub gold_bounty: f32,
}

impl CharacterState {
    pub fn new(id: CharacterId, attributes: AttributeStore) -> Self {
        Self {
            id,
            attributes,
            active_effects: Vec::new(),
            experience_bounty: 0.0,
            gold_bounty: 0.0,
        }
    }

    pub fn with_bounty(mut self, experience: f32, gold: f32) -> Self {
        self.experience_bounty = experience;
        self.gold_bounty = gold;
        self
    }

    /// Alive means strictly positive health.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.attributes.is_alive()
    }

    pub fn active_effect(&self, handle: ActiveEffectHandle) -> Option<&ActiveEffect> {
        self.active_effects.iter().find(|e| e.handle == handle)
    }

    /// Drops the instance record without touching attributes. Rollback and
    /// removal decide separately how the attribute side is undone.
    pub(crate) fn take_active_effect(
        &mut self,
        handle: ActiveEffectHandle,
    ) -> Option<ActiveEffect> {
        let index = self.active_effects.iter().position(|e| e.handle == handle)?;
        Some(self.active_effects.remove(index))
    }
}

/// Owns every character on this timeline.
///
/// Handles are assigned monotonically and never reused, so a stale
/// [`CharacterId`] resolves to `None` rather than to a different character.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterArena {
    characters: Vec<CharacterState>,
    next_id: u32,
    next_effect_handle: u64,
}

impl CharacterArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a character and returns its stable handle.
    pub fn spawn(&mut self, attributes: AttributeStore) -> CharacterId {
        let id = CharacterId(self.next_id);
        self.next_id += 1;
        self.characters.push(CharacterState::new(id, attributes));
        id
    }

    /// Spawns a character with death bounties configured.
    pub fn spawn_with_bounty(
        &mut self,
        attributes: AttributeStore,
        experience_bounty: f32,
        gold_bounty: f32,
    ) -> CharacterId {
        let id = self.spawn(attributes);
        if let Some(character) = self.get_mut(id) {
            character.experience_bounty = experience_bounty;
            character.gold_bounty = gold_bounty;
        }
        id
    }

    pub fn get(&self, id: CharacterId) -> Option<&CharacterState> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut CharacterState> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    pub fn contains(&self, id: CharacterId) -> bool {
        self.get(id).is_some()
    }

    /// Allocates a fresh active-effect handle. Monotonic, never reused.
    pub(crate) fn allocate_effect_handle(&mut self) -> ActiveEffectHandle {
        let handle = ActiveEffectHandle(self.next_effect_handle);
        self.next_effect_handle += 1;
        handle
    }

    /// Characters in handle order. The order is deterministic, which the
    /// state digest relies on.
    pub fn iter(&self) -> impl Iterator<Item = &CharacterState> {
        self.characters.iter()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeStore;

    #[test]
    fn spawn_assigns_monotonic_handles() {
        let mut arena = CharacterArena::new();
        let a = arena.spawn(AttributeStore::with_vitals(100.0, 50.0, 600.0));
        let b = arena.spawn(AttributeStore::with_vitals(100.0, 50.0, 600.0));
        assert_ne!(a, b);
        assert!(arena.get(a).is_some());
        assert!(arena.get(b).is_some());
    }

    #[test]
    fn system_handle_never_resolves() {
        let arena = CharacterArena::new();
        assert!(arena.get(CharacterId::SYSTEM).is_none());
        assert!(CharacterId::SYSTEM.is_system());
    }
}
