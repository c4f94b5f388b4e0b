//! Typed event payloads per topic.

use combat_core::{BountyGrant, CharacterId, DamageTaken, DeathTransition};
use serde::{Deserialize, Serialize};

use crate::animation::{MeshId, MontageHandle};
use crate::prediction::KeyResolution;

/// Combat pipeline events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// A damage application committed.
    DamageTaken(DamageTaken),

    /// A character crossed the alive to dead boundary. Emitted exactly
    /// once per life.
    CharacterDied(DeathTransition),

    /// A kill reward was paid out.
    BountyGranted(BountyGrant),
}

/// Prediction ledger events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PredictionEvent {
    /// A key reached its terminal state. Exactly one per key.
    KeyResolved { key: u64, resolution: KeyResolution },
}

/// Animation replication events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AnimationEvent {
    MontageStarted {
        character: CharacterId,
        mesh: MeshId,
        montage: MontageHandle,
        /// Playback was started speculatively under a prediction key.
        predicted: bool,
    },

    MontageStopped {
        character: CharacterId,
        mesh: MeshId,
        montage: MontageHandle,
    },
}
