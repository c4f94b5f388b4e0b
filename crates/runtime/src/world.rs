//! The per-process view of every synchronized character.
//!
//! [`World`] bundles the shared attribute arena with the per-character
//! synchronization state (net role, montage table) and the cross-cutting
//! services: prediction ledger, ability system, effect and montage
//! registries, event bus. Hosts drive it synchronously: deliver network
//! updates, call the mutation entry points, then [`World::update`] once per
//! tick to expire keys, drain the rejection queue, and advance playback.

use std::collections::BTreeMap;

use combat_core::{
    AttributeKind, AttributeStore, CharacterArena, CharacterId, CombatConfig, CombatEngine,
    DamageOutcome, EffectClassId, state_digest,
};

use crate::ability::{AbilityBehavior, AbilityId, AbilitySystem};
use crate::animation::{
    MeshId, MontageHandle, MontageLibrary, MontageOracle, MontageTable, ReplicatedMontageState,
    MONTAGE_PREDICTION_REJECT_FADETIME,
};
use crate::effects::{AppliedEffect, EffectApplicator, EffectRegistry};
use crate::error::RuntimeError;
use crate::events::{AnimationEvent, CombatEvent, Event, EventBus, PredictionEvent};
use crate::prediction::{PredictionKey, PredictionLedger, RollbackAction};
use crate::targeting::EffectContainerSpec;
use crate::types::{ConnectionId, NetRole, Tick};

/// Synchronization state owned by one character.
#[derive(Debug)]
pub struct CharacterSync {
    pub role: NetRole,
    pub montages: MontageTable,
}

/// One timeline's worth of characters and the services around them.
pub struct World {
    pub arena: CharacterArena,
    pub config: CombatConfig,
    pub effects: EffectRegistry,
    pub library: MontageLibrary,
    pub ledger: PredictionLedger,
    pub abilities: AbilitySystem,
    sync: BTreeMap<CharacterId, CharacterSync>,
    bus: EventBus,
    clock: Tick,
}

impl World {
    pub fn new(config: CombatConfig) -> Self {
        Self {
            arena: CharacterArena::new(),
            config,
            effects: EffectRegistry::new(),
            library: MontageLibrary::new(),
            ledger: PredictionLedger::new(),
            abilities: AbilitySystem::new(),
            sync: BTreeMap::new(),
            bus: EventBus::new(),
            clock: Tick::ZERO,
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn clock(&self) -> Tick {
        self.clock
    }

    /// Deterministic digest of the attribute state, for comparing a
    /// speculative timeline against the authoritative replay.
    pub fn digest(&self) -> [u8; 32] {
        state_digest(&self.arena)
    }

    // ========================================================================
    // Characters
    // ========================================================================

    pub fn spawn_character(&mut self, role: NetRole, attributes: AttributeStore) -> CharacterId {
        let id = self.arena.spawn(attributes);
        self.sync.insert(
            id,
            CharacterSync {
                role,
                montages: MontageTable::new(),
            },
        );
        id
    }

    pub fn spawn_character_with_bounty(
        &mut self,
        role: NetRole,
        attributes: AttributeStore,
        experience_bounty: f32,
        gold_bounty: f32,
    ) -> CharacterId {
        let id = self.spawn_character(role, attributes);
        if let Some(character) = self.arena.get_mut(id) {
            character.experience_bounty = experience_bounty;
            character.gold_bounty = gold_bounty;
        }
        id
    }

    pub fn role(&self, character: CharacterId) -> Option<NetRole> {
        self.sync.get(&character).map(|sync| sync.role)
    }

    pub fn montage_table(&self, character: CharacterId) -> Option<&MontageTable> {
        self.sync.get(&character).map(|sync| &sync.montages)
    }

    // ========================================================================
    // Prediction
    // ========================================================================

    /// Issues a prediction key for a client beginning a speculative action.
    pub fn issue_prediction_key(
        &mut self,
        connection: ConnectionId,
        window: u64,
    ) -> PredictionKey {
        self.ledger.issue(connection, self.clock, window)
    }

    /// Delivers a server confirmation for a key.
    pub fn confirm_key(&mut self, key_id: u64) {
        if self.ledger.confirm(key_id) {
            self.bus.publish(Event::Prediction(PredictionEvent::KeyResolved {
                key: key_id,
                resolution: crate::prediction::KeyResolution::Confirmed,
            }));
        }
    }

    /// Delivers a server rejection for a key. Rollback work runs on the
    /// next [`update`](World::update) when the rejection queue drains.
    pub fn reject_key(&mut self, key_id: u64) {
        self.ledger.reject(key_id);
    }

    // ========================================================================
    // Effects
    // ========================================================================

    /// Applies an effect class to the activating character itself.
    pub fn apply_effect_to_self(
        &mut self,
        owner: CharacterId,
        class: EffectClassId,
        level: f32,
        prediction: Option<&PredictionKey>,
    ) -> Result<AppliedEffect, RuntimeError> {
        self.assert_write_mode(owner, prediction);
        let mut applicator = EffectApplicator::new(
            &mut self.arena,
            &self.config,
            &self.effects,
            &mut self.ledger,
            self.clock,
        );
        let applied = applicator.apply_to_self(owner, class, level, prediction)?;
        self.publish_damage(applied.damage);
        Ok(applied)
    }

    /// Applies an effect class to another character on its behalf.
    pub fn apply_effect_to_target(
        &mut self,
        owner: CharacterId,
        target: CharacterId,
        class: EffectClassId,
        level: f32,
        prediction: Option<&PredictionKey>,
    ) -> Result<AppliedEffect, RuntimeError> {
        self.assert_write_mode(owner, prediction);
        let mut applicator = EffectApplicator::new(
            &mut self.arena,
            &self.config,
            &self.effects,
            &mut self.ledger,
            self.clock,
        );
        let applied = applicator.apply_to_target(owner, target, class, level, prediction)?;
        self.publish_damage(applied.damage);
        Ok(applied)
    }

    /// Applies every effect in a container to every resolved target.
    ///
    /// An empty target set applies nothing and is not an error.
    pub fn apply_container(
        &mut self,
        owner: CharacterId,
        container: &EffectContainerSpec,
        level: f32,
        prediction: Option<&PredictionKey>,
    ) -> Result<Vec<AppliedEffect>, RuntimeError> {
        let mut applied = Vec::new();
        for target in &container.targets {
            for class in &container.effects {
                applied.push(self.apply_effect_to_target(
                    owner,
                    target.character,
                    *class,
                    level,
                    prediction,
                )?);
            }
        }
        Ok(applied)
    }

    /// Direct authoritative attribute write (spawn setup, server
    /// corrections).
    pub fn set_attribute(
        &mut self,
        character: CharacterId,
        kind: AttributeKind,
        value: f32,
    ) -> Result<f32, RuntimeError> {
        let mut engine = CombatEngine::new(&mut self.arena, &self.config);
        Ok(engine.set_attribute(character, kind, value)?)
    }

    /// Applies a replicated attribute commit on a simulated proxy.
    pub fn apply_replicated_attribute(
        &mut self,
        character: CharacterId,
        kind: AttributeKind,
        value: f32,
    ) -> Result<f32, RuntimeError> {
        debug_assert!(
            self.role(character).is_none_or(NetRole::is_simulated),
            "replicated commits are for simulated proxies"
        );
        let mut engine = CombatEngine::new(&mut self.arena, &self.config);
        Ok(engine.set_attribute(character, kind, value)?)
    }

    // ========================================================================
    // Montages
    // ========================================================================

    /// Plays a montage on one of the character's meshes under an ability.
    ///
    /// Returns the playback duration, or a negative sentinel when the mesh
    /// has no animator or the montage is unknown. Under a still-valid
    /// prediction key the playback registers a rollback that stops it with
    /// the fixed rejection fade.
    pub fn play_montage(
        &mut self,
        character: CharacterId,
        mesh: MeshId,
        ability: AbilityId,
        montage: MontageHandle,
        play_rate: f32,
        start_section: Option<&str>,
        prediction: Option<&PredictionKey>,
    ) -> f32 {
        let Some(definition) = self.library.montage(montage).cloned() else {
            tracing::warn!(%montage, "play of unregistered montage");
            return -1.0;
        };
        let Some(sync) = self.sync.get_mut(&character) else {
            return -1.0;
        };

        let duration = sync
            .montages
            .play(mesh, ability, &definition, play_rate, start_section);
        if duration <= 0.0 {
            return duration;
        }

        let mut predicted = false;
        if let Some(key) = prediction
            && self.ledger.can_predict(key, self.clock)
        {
            self.ledger.register_rollback(
                key,
                RollbackAction::StopMontage {
                    character,
                    mesh,
                    montage,
                },
            );
            predicted = true;
        }

        self.bus
            .publish(Event::Animation(AnimationEvent::MontageStarted {
                character,
                mesh,
                montage,
                predicted,
            }));
        duration
    }

    /// Plays a montage for pure replay on an observer, without ability
    /// ownership or prediction.
    pub fn play_montage_simulated(
        &mut self,
        character: CharacterId,
        mesh: MeshId,
        montage: MontageHandle,
        play_rate: f32,
        start_section: Option<&str>,
    ) -> f32 {
        let Some(definition) = self.library.montage(montage).cloned() else {
            tracing::warn!(%montage, "simulated play of unregistered montage");
            return -1.0;
        };
        let Some(sync) = self.sync.get_mut(&character) else {
            return -1.0;
        };

        let duration = sync
            .montages
            .play_simulated(mesh, &definition, play_rate, start_section);
        if duration > 0.0 {
            self.bus
                .publish(Event::Animation(AnimationEvent::MontageStarted {
                    character,
                    mesh,
                    montage,
                    predicted: false,
                }));
        }
        duration
    }

    /// Stops a mesh's current montage; blend defaults to the montage's own
    /// blend-out.
    pub fn stop_montage(
        &mut self,
        character: CharacterId,
        mesh: MeshId,
        blend_override: Option<f32>,
    ) {
        let Some(sync) = self.sync.get_mut(&character) else {
            return;
        };
        let playing = sync.montages.current_montage(mesh);
        sync.montages.stop(mesh, blend_override);

        if let Some(montage) = playing {
            self.bus
                .publish(Event::Animation(AnimationEvent::MontageStopped {
                    character,
                    mesh,
                    montage,
                }));
        }
    }

    pub fn stop_all_montages(&mut self, character: CharacterId, blend_override: Option<f32>) {
        if let Some(sync) = self.sync.get_mut(&character) {
            sync.montages.stop_all(blend_override);
        }
    }

    pub fn jump_to_section(&mut self, character: CharacterId, mesh: MeshId, section: &str) {
        if let Some(sync) = self.sync.get_mut(&character) {
            sync.montages.jump_to_section(mesh, section);
        }
    }

    pub fn set_next_section(
        &mut self,
        character: CharacterId,
        mesh: MeshId,
        from: &str,
        to: &str,
    ) {
        if let Some(sync) = self.sync.get_mut(&character) {
            sync.montages.set_next_section(mesh, from, to);
        }
    }

    pub fn set_montage_play_rate(&mut self, character: CharacterId, mesh: MeshId, rate: f32) {
        if let Some(sync) = self.sync.get_mut(&character) {
            sync.montages.set_play_rate(mesh, rate);
        }
    }

    /// Reconciles a simulated mesh against a client-reported position.
    pub fn reconcile_montage(
        &mut self,
        character: CharacterId,
        mesh: MeshId,
        client_montage: MontageHandle,
        client_position: f32,
        from_section: &str,
        to_section: &str,
    ) {
        if let Some(sync) = self.sync.get_mut(&character) {
            sync.montages
                .reconcile(mesh, client_montage, client_position, from_section, to_section);
        }
    }

    /// Applies an authoritative montage snapshot to a simulated proxy.
    pub fn apply_replicated_montage(
        &mut self,
        character: CharacterId,
        snapshot: &ReplicatedMontageState,
    ) {
        debug_assert!(
            self.role(character).is_none_or(NetRole::is_simulated),
            "montage snapshots are for simulated proxies"
        );
        if let Some(sync) = self.sync.get_mut(&character) {
            sync.montages.apply_replicated(snapshot, &self.library);
        }
    }

    // ========================================================================
    // Abilities
    // ========================================================================

    pub fn grant_ability(
        &mut self,
        owner: CharacterId,
        behavior: Box<dyn AbilityBehavior>,
    ) -> AbilityId {
        self.abilities.grant(owner, behavior)
    }

    pub fn activate_ability(&mut self, id: AbilityId) -> Result<bool, RuntimeError> {
        let owner = self
            .abilities
            .owner_of(id)
            .ok_or(RuntimeError::AbilityNotGranted(id))?;
        let sync = self
            .sync
            .get_mut(&owner)
            .ok_or(RuntimeError::AbilityNotGranted(id))?;
        self.abilities.try_activate(id, &mut sync.montages)
    }

    pub fn end_ability(&mut self, id: AbilityId) -> Result<(), RuntimeError> {
        let owner = self
            .abilities
            .owner_of(id)
            .ok_or(RuntimeError::AbilityNotGranted(id))?;
        let sync = self
            .sync
            .get_mut(&owner)
            .ok_or(RuntimeError::AbilityNotGranted(id))?;
        self.abilities.end_ability(id, &mut sync.montages)
    }

    pub fn cancel_ability(&mut self, id: AbilityId) -> Result<(), RuntimeError> {
        let owner = self
            .abilities
            .owner_of(id)
            .ok_or(RuntimeError::AbilityNotGranted(id))?;
        let sync = self
            .sync
            .get_mut(&owner)
            .ok_or(RuntimeError::AbilityNotGranted(id))?;
        self.abilities.cancel_ability(id, &mut sync.montages)
    }

    pub fn ability_input_released(&mut self, id: AbilityId) -> Result<(), RuntimeError> {
        let owner = self
            .abilities
            .owner_of(id)
            .ok_or(RuntimeError::AbilityNotGranted(id))?;
        let sync = self
            .sync
            .get_mut(&owner)
            .ok_or(RuntimeError::AbilityNotGranted(id))?;
        self.abilities.input_released(id, &mut sync.montages)
    }

    // ========================================================================
    // Update tick
    // ========================================================================

    /// Advances the world one update: expires overdue prediction keys,
    /// drains the rejection queue (running every rollback), and steps
    /// montage playback by `dt` seconds.
    pub fn update(&mut self, now: Tick, dt: f32) {
        self.clock = now;
        self.ledger.tick(now);

        for entry in self.ledger.drain_rejections() {
            self.bus
                .publish(Event::Prediction(PredictionEvent::KeyResolved {
                    key: entry.key.id,
                    resolution: entry.resolution,
                }));

            for action in entry.rollbacks {
                self.run_rollback(action);
            }
        }

        for sync in self.sync.values_mut() {
            sync.montages.advance(dt);
        }
    }

    fn run_rollback(&mut self, action: RollbackAction) {
        match action {
            RollbackAction::RevertEffects(journal) => {
                let mut engine = CombatEngine::new(&mut self.arena, &self.config);
                engine.revert(&journal);
            }
            RollbackAction::StopMontage {
                character,
                mesh,
                montage,
            } => {
                // The fixed rejection fade, not the montage's blend-out: a
                // refused preview dies fast. Skipped when another montage
                // already took the mesh over.
                if let Some(sync) = self.sync.get_mut(&character) {
                    let was_current = sync.montages.current_montage(mesh) == Some(montage);
                    sync.montages.stop_if_current(
                        mesh,
                        montage,
                        Some(MONTAGE_PREDICTION_REJECT_FADETIME),
                    );
                    if was_current {
                        self.bus
                            .publish(Event::Animation(AnimationEvent::MontageStopped {
                                character,
                                mesh,
                                montage,
                            }));
                    }
                }
            }
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn assert_write_mode(&self, owner: CharacterId, prediction: Option<&PredictionKey>) {
        debug_assert!(
            prediction.is_some()
                || self
                    .role(owner)
                    .is_none_or(|role| role.has_authority()),
            "unpredicted effect application requires authority"
        );
    }

    fn publish_damage(&self, damage: Option<DamageOutcome>) {
        let Some(damage) = damage else {
            return;
        };

        self.bus
            .publish(Event::Combat(CombatEvent::DamageTaken(damage.taken)));
        if let Some(death) = damage.death {
            self.bus
                .publish(Event::Combat(CombatEvent::CharacterDied(death)));
        }
        if let Some(bounty) = damage.bounty {
            self.bus
                .publish(Event::Combat(CombatEvent::BountyGranted(bounty)));
        }
    }
}
