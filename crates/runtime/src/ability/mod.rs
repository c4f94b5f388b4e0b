//! Ability lifecycle and its coupling to animation ownership.
//!
//! An ability is a plain record plus a behavior object implementing
//! activate / can_activate / input-release / cancel. Every activation is
//! instanced: when an ability ends, normally or cancelled, the system
//! clears its animation ownership on every mesh it held, which is always
//! sufficient cleanup. (A non-instanced design would need a separate
//! structure to track in-flight montages; this runtime does not have that
//! problem by construction.)

mod jump;

pub use jump::JumpAbility;

use std::fmt;

use combat_core::CharacterId;
use serde::{Deserialize, Serialize};

use crate::animation::MontageTable;
use crate::error::RuntimeError;

/// Stable handle for a granted ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AbilityId(pub u64);

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ability:{}", self.0)
    }
}

/// What a behavior can reach while it runs.
pub struct AbilityContext<'a> {
    pub owner: CharacterId,
    pub ability: AbilityId,
    pub montages: &'a mut MontageTable,
}

/// Behavior of one ability.
///
/// Behaviors are trait objects rather than a class hierarchy; the system
/// drives them through the lifecycle and handles the shared cleanup.
pub trait AbilityBehavior: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the ability may activate right now.
    fn can_activate(&self, _owner: CharacterId) -> bool {
        true
    }

    /// Runs the activation. Returning false aborts it.
    fn activate(&mut self, ctx: &mut AbilityContext<'_>) -> bool;

    /// Input released while the ability is active. Returning true asks the
    /// system to cancel the ability.
    fn on_input_released(&mut self, _ctx: &mut AbilityContext<'_>) -> bool {
        false
    }

    /// The ability is being cancelled before it ended on its own.
    fn cancel(&mut self, _ctx: &mut AbilityContext<'_>) {}
}

struct GrantedAbility {
    id: AbilityId,
    owner: CharacterId,
    behavior: Box<dyn AbilityBehavior>,
    active: bool,
}

/// Owns granted abilities and drives their lifecycle.
#[derive(Default)]
pub struct AbilitySystem {
    abilities: Vec<GrantedAbility>,
    next_id: u64,
}

impl AbilitySystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants an ability to a character and returns its handle.
    pub fn grant(&mut self, owner: CharacterId, behavior: Box<dyn AbilityBehavior>) -> AbilityId {
        let id = AbilityId(self.next_id);
        self.next_id += 1;
        self.abilities.push(GrantedAbility {
            id,
            owner,
            behavior,
            active: false,
        });
        id
    }

    pub fn owner_of(&self, id: AbilityId) -> Option<CharacterId> {
        self.find(id).map(|ability| ability.owner)
    }

    pub fn is_active(&self, id: AbilityId) -> bool {
        self.find(id).is_some_and(|ability| ability.active)
    }

    /// Attempts to activate an ability. Returns whether it activated.
    pub fn try_activate(
        &mut self,
        id: AbilityId,
        montages: &mut MontageTable,
    ) -> Result<bool, RuntimeError> {
        let ability = self.find_mut(id)?;
        if !ability.behavior.can_activate(ability.owner) {
            return Ok(false);
        }

        let mut ctx = AbilityContext {
            owner: ability.owner,
            ability: ability.id,
            montages,
        };
        let activated = ability.behavior.activate(&mut ctx);
        ability.active = activated;
        tracing::debug!(%id, name = ability.behavior.name(), activated, "ability activation");
        Ok(activated)
    }

    /// Ends an ability normally and clears its animation ownership.
    pub fn end_ability(
        &mut self,
        id: AbilityId,
        montages: &mut MontageTable,
    ) -> Result<(), RuntimeError> {
        let ability = self.find_mut(id)?;
        ability.active = false;
        montages.clear_ability(id);
        Ok(())
    }

    /// Cancels an in-flight ability: runs its cancel hook, then the same
    /// cleanup as a normal end.
    pub fn cancel_ability(
        &mut self,
        id: AbilityId,
        montages: &mut MontageTable,
    ) -> Result<(), RuntimeError> {
        let ability = self.find_mut(id)?;
        if ability.active {
            let mut ctx = AbilityContext {
                owner: ability.owner,
                ability: ability.id,
                montages,
            };
            ability.behavior.cancel(&mut ctx);
        }
        self.end_ability(id, montages)
    }

    /// Forwards an input release; cancels the ability when the behavior
    /// asks for it.
    pub fn input_released(
        &mut self,
        id: AbilityId,
        montages: &mut MontageTable,
    ) -> Result<(), RuntimeError> {
        let ability = self.find_mut(id)?;
        if !ability.active {
            return Ok(());
        }

        let mut ctx = AbilityContext {
            owner: ability.owner,
            ability: ability.id,
            montages,
        };
        let cancel = ability.behavior.on_input_released(&mut ctx);
        if cancel {
            self.cancel_ability(id, montages)?;
        }
        Ok(())
    }

    fn find(&self, id: AbilityId) -> Option<&GrantedAbility> {
        self.abilities.iter().find(|ability| ability.id == id)
    }

    fn find_mut(&mut self, id: AbilityId) -> Result<&mut GrantedAbility, RuntimeError> {
        self.abilities
            .iter_mut()
            .find(|ability| ability.id == id)
            .ok_or(RuntimeError::AbilityNotGranted(id))
    }
}
