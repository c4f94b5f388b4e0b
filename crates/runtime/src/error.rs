//! Runtime errors.
//!
//! Montage playback failures are deliberately not here: a missing animator
//! or montage returns the negative-duration sentinel from the table, since
//! animation is cosmetic to gameplay-critical state. `KeyAlreadyResolved`
//! exists for diagnostics but resolution entry points treat it as a logged
//! no-op rather than surfacing it.

use combat_core::EffectError;

use crate::ability::AbilityId;
use crate::animation::MeshId;

/// Errors surfaced by the synchronization runtime.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// The mesh has no playable animation context.
    #[error("No animator available for mesh {0}")]
    NoAnimatorAvailable(MeshId),

    /// A prediction key was resolved a second time.
    #[error("Prediction key {0} already resolved")]
    KeyAlreadyResolved(u64),

    /// The ability handle does not refer to a granted ability.
    #[error("Ability {0} not granted")]
    AbilityNotGranted(AbilityId),

    /// Effect application failed in the core engine.
    #[error(transparent)]
    Effect(#[from] EffectError),
}
