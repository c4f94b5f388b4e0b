//! Prediction-aware effect application.
//!
//! The applicator is the runtime half of the effect engine: it resolves the
//! effect class, applies the spec through `combat-core`, and decides what
//! happens to the undo journal. Without a prediction key the application is
//! authoritative and the journal is discarded; under a valid key the
//! journal is registered with the ledger so a rejection can revert every
//! write byte-exactly.

use std::collections::HashMap;

use combat_core::{
    ActiveEffectHandle, CharacterArena, CharacterId, CombatConfig, CombatEngine, DamageOutcome,
    EffectClassId, EffectContext, EffectError, EffectOracle, GameplayEffectDef,
};

use crate::error::RuntimeError;
use crate::prediction::{PredictionKey, PredictionLedger, RollbackAction};
use crate::types::Tick;

/// In-memory effect definition registry for hosts and tests.
#[derive(Debug, Default)]
pub struct EffectRegistry {
    definitions: HashMap<EffectClassId, GameplayEffectDef>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, class: EffectClassId, definition: GameplayEffectDef) {
        let replaced = self.definitions.insert(class, definition);
        debug_assert!(replaced.is_none(), "effect class registered twice");
    }
}

impl EffectOracle for EffectRegistry {
    fn definition(&self, class: EffectClassId) -> Option<&GameplayEffectDef> {
        self.definitions.get(&class)
    }
}

/// Successful application, as handed back to ability logic.
#[derive(Clone, Debug, PartialEq)]
pub struct AppliedEffect {
    /// Tracked instance for duration effects.
    pub active: Option<ActiveEffectHandle>,

    /// Damage pipeline outcome, when the effect wrote the Damage scratch.
    pub damage: Option<DamageOutcome>,
}

/// Applies gameplay effects to self or to a target, optionally under a
/// prediction key.
pub struct EffectApplicator<'a> {
    arena: &'a mut CharacterArena,
    config: &'a CombatConfig,
    oracle: &'a dyn EffectOracle,
    ledger: &'a mut PredictionLedger,
    now: Tick,
}

impl<'a> EffectApplicator<'a> {
    pub fn new(
        arena: &'a mut CharacterArena,
        config: &'a CombatConfig,
        oracle: &'a dyn EffectOracle,
        ledger: &'a mut PredictionLedger,
        now: Tick,
    ) -> Self {
        Self {
            arena,
            config,
            oracle,
            ledger,
            now,
        }
    }

    /// Applies an effect class to the activating character itself.
    pub fn apply_to_self(
        &mut self,
        owner: CharacterId,
        class: EffectClassId,
        level: f32,
        prediction: Option<&PredictionKey>,
    ) -> Result<AppliedEffect, RuntimeError> {
        let context = EffectContext::new(owner);
        self.apply(owner, class, level, context, prediction)
    }

    /// Applies an effect class to another character on its behalf.
    ///
    /// The target's own change policy governs the writes; this is the only
    /// sanctioned cross-character mutation path.
    pub fn apply_to_target(
        &mut self,
        owner: CharacterId,
        target: CharacterId,
        class: EffectClassId,
        level: f32,
        prediction: Option<&PredictionKey>,
    ) -> Result<AppliedEffect, RuntimeError> {
        if !self.arena.contains(target) {
            tracing::debug!(%owner, %target, %class, "effect application with no target");
            return Err(EffectError::InvalidTarget.into());
        }

        let context = EffectContext::new(owner);
        self.apply(target, class, level, context, prediction)
    }

    fn apply(
        &mut self,
        target: CharacterId,
        class: EffectClassId,
        level: f32,
        context: EffectContext,
        prediction: Option<&PredictionKey>,
    ) -> Result<AppliedEffect, RuntimeError> {
        let Some(definition) = self.oracle.definition(class) else {
            tracing::error!(%class, "effect application with unknown class");
            return Err(EffectError::InvalidEffectClass(class).into());
        };

        let spec = definition.make_spec(level, context);
        let mut engine = CombatEngine::new(self.arena, self.config);
        let outcome = engine.apply_spec(target, &spec)?;

        // Under a still-valid key the application is speculative: keep the
        // journal so a rejection can undo it. Otherwise this is authority
        // semantics and the journal is dropped.
        if let Some(key) = prediction
            && self.ledger.can_predict(key, self.now)
        {
            self.ledger
                .register_rollback(key, RollbackAction::RevertEffects(outcome.journal));
        }

        Ok(AppliedEffect {
            active: outcome.active,
            damage: outcome.damage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{AttributeKind, AttributeStore, DurationPolicy, Modifier};

    use crate::types::ConnectionId;

    fn registry() -> EffectRegistry {
        let mut registry = EffectRegistry::new();
        registry.register(
            EffectClassId(1),
            GameplayEffectDef::new("damage.basic", DurationPolicy::Instant)
                .with_modifier(Modifier::add(AttributeKind::Damage, 10.0)),
        );
        registry
    }

    #[test]
    fn unknown_class_fails_with_invalid_effect_class() {
        let mut arena = CharacterArena::new();
        let owner = arena.spawn(AttributeStore::with_vitals(100.0, 50.0, 600.0));
        let config = CombatConfig::default();
        let registry = registry();
        let mut ledger = PredictionLedger::new();

        let mut applicator =
            EffectApplicator::new(&mut arena, &config, &registry, &mut ledger, Tick(0));
        let err = applicator
            .apply_to_self(owner, EffectClassId(99), 1.0, None)
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Effect(EffectError::InvalidEffectClass(_))
        ));
    }

    #[test]
    fn missing_target_fails_with_invalid_target() {
        let mut arena = CharacterArena::new();
        let owner = arena.spawn(AttributeStore::with_vitals(100.0, 50.0, 600.0));
        let config = CombatConfig::default();
        let registry = registry();
        let mut ledger = PredictionLedger::new();

        let mut applicator =
            EffectApplicator::new(&mut arena, &config, &registry, &mut ledger, Tick(0));
        let err = applicator
            .apply_to_target(owner, combat_core::CharacterId(42), EffectClassId(1), 1.0, None)
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Effect(EffectError::InvalidTarget)
        ));
    }

    #[test]
    fn expired_key_falls_back_to_authority_semantics() {
        let mut arena = CharacterArena::new();
        let owner = arena.spawn(AttributeStore::with_vitals(100.0, 50.0, 600.0));
        let config = CombatConfig::default();
        let registry = registry();
        let mut ledger = PredictionLedger::new();
        let key = ledger.issue(ConnectionId(1), Tick(0), 5);

        // Past the validity window: the application lands, but nothing is
        // registered for rollback.
        let mut applicator =
            EffectApplicator::new(&mut arena, &config, &registry, &mut ledger, Tick(20));
        applicator
            .apply_to_self(owner, EffectClassId(1), 1.0, Some(&key))
            .unwrap();

        ledger.reject(key.id);
        let drained = ledger.drain_rejections();
        assert_eq!(drained[0].rollbacks.len(), 0);
        assert_eq!(arena.get(owner).unwrap().attributes.health(), 90.0);
    }
}
