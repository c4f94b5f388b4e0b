//! Target resolution for effect application.
//!
//! Resolvers are a closed set of variants plus an escape hatch for custom
//! logic. All of them return a possibly-empty list of target descriptors;
//! an empty list means "no effect is applied", never an error.

use combat_core::{CharacterId, EffectClassId};

/// One resolved target of an effect application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub character: CharacterId,
}

impl TargetDescriptor {
    pub fn new(character: CharacterId) -> Self {
        Self { character }
    }
}

/// Payload of the event that triggered an ability, carrying targets that
/// were already computed upstream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventData {
    pub instigator: Option<CharacterId>,
    pub targets: Vec<TargetDescriptor>,
}

/// Capability for arbitrary targeting logic.
pub trait ResolveTargets: Send + Sync {
    fn resolve(&self, owner: CharacterId, event: Option<&EventData>) -> Vec<TargetDescriptor>;
}

/// How an ability selects the characters its effects land on.
pub enum TargetResolver {
    /// The activating character targets itself.
    UseOwner,

    /// Targets were already computed by the triggering event.
    UseEventData,

    /// Arbitrary game-specific targeting.
    Custom(Box<dyn ResolveTargets>),
}

impl TargetResolver {
    /// Resolves targets for `owner`. Empty means nothing gets applied.
    pub fn resolve(
        &self,
        owner: CharacterId,
        event: Option<&EventData>,
    ) -> Vec<TargetDescriptor> {
        match self {
            TargetResolver::UseOwner => vec![TargetDescriptor::new(owner)],
            TargetResolver::UseEventData => event
                .map(|data| data.targets.clone())
                .unwrap_or_default(),
            TargetResolver::Custom(resolver) => resolver.resolve(owner, event),
        }
    }
}

/// Resolved targets bundled with the effect classes to apply to them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectContainerSpec {
    pub targets: Vec<TargetDescriptor>,
    pub effects: Vec<EffectClassId>,
}

impl EffectContainerSpec {
    pub fn new(effects: Vec<EffectClassId>) -> Self {
        Self {
            targets: Vec::new(),
            effects,
        }
    }

    pub fn has_valid_effects(&self) -> bool {
        !self.effects.is_empty()
    }

    pub fn has_valid_targets(&self) -> bool {
        !self.targets.is_empty()
    }

    pub fn add_targets(&mut self, targets: &[TargetDescriptor]) {
        self.targets.extend_from_slice(targets);
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }
}
