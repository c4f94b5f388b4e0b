//! Effect application and damage resolution pipeline.
//!
//! The [`CombatEngine`] is the authoritative reducer for a
//! [`CharacterArena`]. Every attribute mutation flows through the same
//! commit path: proposal, change policy, optional paired rescale, write,
//! post-commit clamp. A Damage consumption and its health clamp plus
//! death/bounty side effects run inside the same `apply_spec` call, so no
//! other write on the same arena can observe a half-applied resolution.
//!
//! Speculative callers keep the returned [`EffectJournal`]; reverting it
//! restores the arena byte-exactly.

use crate::attribute::{AttributeKind, ChangePolicy};
use crate::character::{CharacterArena, CharacterId};
use crate::combat::{BountyGrant, DamageOutcome, DamageTaken, DeathTransition, plan_damage};
use crate::config::CombatConfig;
use crate::effect::{
    ActiveEffect, ActiveEffectHandle, DurationPolicy, EffectContext, EffectJournal, EffectTags,
    GameplayEffectSpec, ModOp, Modifier,
};
use crate::error::EffectError;

/// Complete outcome of one effect application.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectOutcome {
    /// Handle of the tracked instance for duration and infinite effects.
    pub active: Option<ActiveEffectHandle>,

    /// Result of the damage pipeline when the spec wrote the Damage scratch.
    pub damage: Option<DamageOutcome>,

    /// Undo record covering every write this application performed,
    /// including cascaded rescales and bounty payouts.
    pub journal: EffectJournal,
}

/// Reducer over a [`CharacterArena`].
///
/// Cross-character writes exist only here: `apply_spec` may mutate another
/// character's store on its behalf, always under that character's own
/// change policy.
pub struct CombatEngine<'a> {
    arena: &'a mut CharacterArena,
    config: &'a CombatConfig,
}

impl<'a> CombatEngine<'a> {
    pub fn new(arena: &'a mut CharacterArena, config: &'a CombatConfig) -> Self {
        Self { arena, config }
    }

    pub fn arena(&self) -> &CharacterArena {
        self.arena
    }

    /// Applies a fully-resolved spec to `target`.
    ///
    /// Modifiers commit in spec order. If any of them wrote the Damage
    /// scratch, the damage resolution pipeline runs before this call
    /// returns, as one atomic unit with the rest of the application.
    pub fn apply_spec(
        &mut self,
        target: CharacterId,
        spec: &GameplayEffectSpec,
    ) -> Result<EffectOutcome, EffectError> {
        if !self.arena.contains(target) {
            return Err(EffectError::CharacterNotFound(target));
        }

        let mut journal = EffectJournal::new();
        let permanent = matches!(spec.duration, DurationPolicy::Instant);
        let mut applied = Vec::new();
        let mut wrote_damage = false;

        for modifier in &spec.modifiers {
            let delta = self.commit_modifier(&mut journal, target, modifier, permanent)?;
            wrote_damage |= modifier.attribute == AttributeKind::Damage;
            // Meta attributes are consumed below; there is nothing for a
            // later removal to subtract.
            if !permanent && !modifier.attribute.is_meta() {
                applied.push((modifier.attribute, delta));
            }
        }

        let damage = if wrote_damage {
            self.resolve_damage(&mut journal, target, spec.context, spec.tags)
        } else {
            None
        };

        let active = if permanent {
            None
        } else {
            let handle = self.arena.allocate_effect_handle();
            let character = self
                .arena
                .get_mut(target)
                .ok_or(EffectError::CharacterNotFound(target))?;
            character.active_effects.push(ActiveEffect {
                handle,
                target,
                source: spec.context.source,
                duration: spec.duration,
                tags: spec.tags,
                applied,
            });
            journal.record_activation(target, handle);
            Some(handle)
        };

        Ok(EffectOutcome {
            active,
            damage,
            journal,
        })
    }

    /// Direct authoritative write of one attribute's current value.
    ///
    /// Used for spawn-time initialization and server corrections. Runs the
    /// full policy path; writing the Damage scratch consumes it immediately
    /// with a system context (no bounty owner).
    pub fn set_attribute(
        &mut self,
        target: CharacterId,
        kind: AttributeKind,
        value: f32,
    ) -> Result<f32, EffectError> {
        let mut journal = EffectJournal::new();
        let modifier = Modifier::new(kind, ModOp::Override, value);
        self.commit_modifier(&mut journal, target, &modifier, true)?;

        if kind == AttributeKind::Damage {
            self.resolve_damage(
                &mut journal,
                target,
                EffectContext::new(CharacterId::SYSTEM),
                EffectTags::empty(),
            );
        }

        let character = self
            .arena
            .get(target)
            .ok_or(EffectError::CharacterNotFound(target))?;
        Ok(character.attributes.current(kind))
    }

    /// Removes a tracked duration effect, subtracting its effective deltas
    /// through the validated write path.
    ///
    /// Removing a max-attribute delta rescales the paired current attribute
    /// the same way applying it did, so the ratio survives buff expiry.
    pub fn remove_active_effect(
        &mut self,
        target: CharacterId,
        handle: ActiveEffectHandle,
    ) -> Result<(), EffectError> {
        let effect = self
            .arena
            .get_mut(target)
            .ok_or(EffectError::CharacterNotFound(target))?
            .take_active_effect(handle)
            .ok_or(EffectError::EffectNotActive(handle))?;

        let mut journal = EffectJournal::new();
        for (kind, delta) in effect.applied.iter().rev() {
            let modifier = Modifier::add(*kind, -delta);
            self.commit_modifier(&mut journal, target, &modifier, false)?;
        }
        Ok(())
    }

    /// Rolls back everything a journal recorded. Safe to call when parts of
    /// the speculative state were already cleaned up; missing characters
    /// and handles are skipped.
    pub fn revert(&mut self, journal: &EffectJournal) {
        for (character, handle) in journal.activated.iter().rev() {
            if let Some(state) = self.arena.get_mut(*character) {
                state.take_active_effect(*handle);
            }
        }

        for write in journal.writes.iter().rev() {
            if let Some(state) = self.arena.get_mut(write.character) {
                state.attributes.restore(write.attribute, write.previous);
            }
        }
    }

    // ========================================================================
    // Commit path
    // ========================================================================

    /// Commits one modifier: proposal, policy, paired rescale, write,
    /// post-commit clamp. Returns the effective delta on the current value.
    fn commit_modifier(
        &mut self,
        journal: &mut EffectJournal,
        target: CharacterId,
        modifier: &Modifier,
        permanent: bool,
    ) -> Result<f32, EffectError> {
        let policy = ChangePolicy::new(self.config);
        let kind = modifier.attribute;

        let (old_current, proposal) = {
            let character = self
                .arena
                .get(target)
                .ok_or(EffectError::CharacterNotFound(target))?;
            let old_current = character.attributes.current(kind);
            let proposed = match modifier.op {
                ModOp::Add => old_current + modifier.magnitude,
                ModOp::Multiply => old_current * modifier.magnitude,
                ModOp::Override => modifier.magnitude,
            };
            (old_current, policy.propose(&character.attributes, kind, proposed))
        };

        // A max change adjusts the paired current attribute first, through
        // this same path. The paired write must not clamp against the max,
        // which still holds its old value at this point.
        if let Some(rescale) = proposal.rescale {
            let paired = Modifier::add(rescale.attribute, rescale.delta);
            self.write_accepted(journal, target, &paired, permanent, false)?;
        }

        let accepted = Modifier::new(kind, ModOp::Override, proposal.value);
        self.write_accepted(journal, target, &accepted, permanent, true)?;

        let character = self
            .arena
            .get(target)
            .ok_or(EffectError::CharacterNotFound(target))?;
        Ok(character.attributes.current(kind) - old_current)
    }

    /// The single place current (and for permanent writes, base) values are
    /// stored. `clamp_to_max` applies the post-commit `[0, max]` clamp for
    /// capped attributes.
    fn write_accepted(
        &mut self,
        journal: &mut EffectJournal,
        target: CharacterId,
        modifier: &Modifier,
        permanent: bool,
        clamp_to_max: bool,
    ) -> Result<(), EffectError> {
        let character = self
            .arena
            .get_mut(target)
            .ok_or(EffectError::CharacterNotFound(target))?;
        let store = &mut character.attributes;
        let kind = modifier.attribute;
        let previous = store.attribute(kind);

        let mut value = match modifier.op {
            ModOp::Add => previous.current + modifier.magnitude,
            ModOp::Multiply => previous.current * modifier.magnitude,
            ModOp::Override => modifier.magnitude,
        };

        if clamp_to_max {
            if let Some(max_kind) = kind.paired_max() {
                value = value.clamp(0.0, store.current(max_kind));
            }
        }

        journal.record_write(target, kind, previous);
        store.set_current(kind, value);
        if permanent {
            store.set_base(kind, previous.base + (value - previous.current));
        }
        Ok(())
    }

    // ========================================================================
    // Damage resolution
    // ========================================================================

    /// Consumes the Damage scratch attribute on `target`.
    ///
    /// The scratch resets to zero unconditionally so a value can never be
    /// applied twice. Death and bounty side effects fire only on the write
    /// that crosses the alive to dead boundary, and never for self damage.
    fn resolve_damage(
        &mut self,
        journal: &mut EffectJournal,
        target: CharacterId,
        context: EffectContext,
        tags: EffectTags,
    ) -> Option<DamageOutcome> {
        let (damage, plan, experience_bounty, gold_bounty) = {
            let character = self.arena.get_mut(target)?;
            let store = &mut character.attributes;

            let damage = store.current(AttributeKind::Damage);
            journal.record_write(target, AttributeKind::Damage, store.attribute(AttributeKind::Damage));
            store.set_current(AttributeKind::Damage, 0.0);
            store.set_base(AttributeKind::Damage, 0.0);

            let plan = plan_damage(store.health(), store.max_health(), damage)?;

            journal.record_write(target, AttributeKind::Health, store.attribute(AttributeKind::Health));
            let delta = plan.new_health - store.health();
            let base = store.base(AttributeKind::Health);
            store.set_current(AttributeKind::Health, plan.new_health);
            store.set_base(AttributeKind::Health, base + delta);

            (damage, plan, character.experience_bounty, character.gold_bounty)
        };

        let taken = DamageTaken {
            target,
            source: context.causer,
            amount: damage,
            headshot: tags.contains(EffectTags::HEADSHOT),
        };

        let mut death = None;
        let mut bounty = None;

        if plan.lethal {
            let self_inflicted = context.source == target;
            death = Some(DeathTransition {
                character: target,
                killer: (!self_inflicted && !context.source.is_system())
                    .then_some(context.source),
            });

            // Target was alive and is no longer: pay the bounty to the
            // source, unless the source killed itself.
            if !self_inflicted && self.arena.contains(context.source) {
                bounty =
                    self.apply_bounty(journal, context.source, experience_bounty, gold_bounty);
            }
        }

        Some(DamageOutcome {
            taken,
            death,
            bounty,
        })
    }

    /// Pays a kill reward by applying a synthesized instant effect to the
    /// receiver, inside the caller's journal so speculative damage rolls
    /// the reward back too.
    fn apply_bounty(
        &mut self,
        journal: &mut EffectJournal,
        receiver: CharacterId,
        experience: f32,
        gold: f32,
    ) -> Option<BountyGrant> {
        let modifiers = [
            Modifier::add(AttributeKind::Experience, experience),
            Modifier::add(AttributeKind::Gold, gold),
        ];
        for modifier in &modifiers {
            if self
                .commit_modifier(journal, receiver, modifier, true)
                .is_err()
            {
                return None;
            }
        }

        Some(BountyGrant {
            receiver,
            experience,
            gold,
        })
    }
}
