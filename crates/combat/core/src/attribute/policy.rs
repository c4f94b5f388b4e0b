//! Pre-commit validation for attribute writes.
//!
//! The policy intercepts every proposed write before it is committed:
//!
//! - A max attribute about to change produces a [`Rescale`] of the paired
//!   current attribute so the current/max ratio survives the change. The
//!   rescale is an additive delta that the engine pushes through the same
//!   validated write path, so observers see a consistent two-step change.
//! - MoveSpeed is clamped to the configured bounds regardless of source.
//! - Everything else passes through; post-commit clamping of capped
//!   attributes is the engine's job.
//!
//! Out-of-range input is never an error. The accepted value is what gets
//! committed.

use super::{AttributeKind, AttributeStore};
use crate::config::CombatConfig;

/// Additive adjustment of a paired current attribute, produced when its max
/// changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rescale {
    /// The current attribute to adjust (e.g. Health when MaxHealth moves).
    pub attribute: AttributeKind,
    /// Additive delta. Applying it before the max commits yields
    /// `current * new_max / old_max` (or `new_max` when the old max was 0).
    pub delta: f32,
}

/// Accepted value plus any paired adjustment the engine must apply first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Proposal {
    pub value: f32,
    pub rescale: Option<Rescale>,
}

/// Stateless validator for proposed attribute changes.
#[derive(Clone, Copy, Debug)]
pub struct ChangePolicy<'a> {
    config: &'a CombatConfig,
}

impl<'a> ChangePolicy<'a> {
    pub fn new(config: &'a CombatConfig) -> Self {
        Self { config }
    }

    /// Validates a proposed new current value for `kind`.
    ///
    /// Never fails: non-finite proposals fall back to the present value and
    /// out-of-range MoveSpeed is clamped silently.
    pub fn propose(
        &self,
        store: &AttributeStore,
        kind: AttributeKind,
        new_value: f32,
    ) -> Proposal {
        if !new_value.is_finite() {
            return Proposal {
                value: store.current(kind),
                rescale: None,
            };
        }

        match kind {
            AttributeKind::MaxHealth | AttributeKind::MaxStamina => Proposal {
                value: new_value,
                rescale: self.rescale_for_max_change(store, kind, new_value),
            },
            AttributeKind::MoveSpeed => Proposal {
                value: new_value.clamp(self.config.move_speed_min, self.config.move_speed_max),
                rescale: None,
            },
            _ => Proposal {
                value: new_value,
                rescale: None,
            },
        }
    }

    /// Keeps the paired current attribute at the same fraction of its max.
    ///
    /// Mirrors the two cases of the invariant: with `old_max > 0` the ratio
    /// is preserved; with `old_max == 0` the current snaps to the new max.
    fn rescale_for_max_change(
        &self,
        store: &AttributeStore,
        max_kind: AttributeKind,
        new_max: f32,
    ) -> Option<Rescale> {
        let affected = max_kind.paired_current()?;
        let old_max = store.current(max_kind);
        if (new_max - old_max).abs() <= f32::EPSILON {
            return None;
        }

        let current = store.current(affected);
        let delta = if old_max > 0.0 {
            current * new_max / old_max - current
        } else {
            new_max - current
        };

        Some(Rescale {
            attribute: affected,
            delta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> AttributeStore {
        AttributeStore::with_vitals(100.0, 80.0, 600.0)
    }

    #[test]
    fn max_change_preserves_ratio() {
        let config = CombatConfig::default();
        let policy = ChangePolicy::new(&config);
        let mut store = store();
        store.set_current(AttributeKind::Health, 50.0);

        let proposal = policy.propose(&store, AttributeKind::MaxHealth, 200.0);
        assert_eq!(proposal.value, 200.0);
        let rescale = proposal.rescale.unwrap();
        assert_eq!(rescale.attribute, AttributeKind::Health);
        // 50/100 of 200 is 100, so the delta is +50.
        assert!((rescale.delta - 50.0).abs() < 1e-4);
    }

    #[test]
    fn max_change_from_zero_snaps_current_to_new_max() {
        let config = CombatConfig::default();
        let policy = ChangePolicy::new(&config);
        let mut store = AttributeStore::new();
        store.set_current(AttributeKind::Health, 0.0);

        let proposal = policy.propose(&store, AttributeKind::MaxHealth, 150.0);
        let rescale = proposal.rescale.unwrap();
        assert_eq!(rescale.delta, 150.0);
    }

    #[test]
    fn unchanged_max_produces_no_rescale() {
        let config = CombatConfig::default();
        let policy = ChangePolicy::new(&config);
        let store = store();

        let proposal = policy.propose(&store, AttributeKind::MaxHealth, 100.0);
        assert!(proposal.rescale.is_none());
    }

    #[test]
    fn move_speed_is_clamped_both_ways() {
        let config = CombatConfig::default();
        let policy = ChangePolicy::new(&config);
        let store = store();

        assert_eq!(
            policy.propose(&store, AttributeKind::MoveSpeed, 40.0).value,
            CombatConfig::DEFAULT_MOVE_SPEED_MIN
        );
        assert_eq!(
            policy
                .propose(&store, AttributeKind::MoveSpeed, 5000.0)
                .value,
            CombatConfig::DEFAULT_MOVE_SPEED_MAX
        );
        assert_eq!(
            policy.propose(&store, AttributeKind::MoveSpeed, 450.0).value,
            450.0
        );
    }

    #[test]
    fn non_finite_proposal_keeps_present_value() {
        let config = CombatConfig::default();
        let policy = ChangePolicy::new(&config);
        let store = store();

        let proposal = policy.propose(&store, AttributeKind::Health, f32::NAN);
        assert_eq!(proposal.value, store.health());
        assert!(proposal.rescale.is_none());
    }
}
