//! The prediction ledger.

use std::collections::BTreeMap;

use combat_core::{CharacterId, EffectJournal};

use crate::animation::{MeshId, MontageHandle};
use crate::error::RuntimeError;
use crate::types::{ConnectionId, Tick};

use super::{KeyResolution, PredictionKey};

/// One undo step registered under a prediction key.
///
/// Variants describe the rollback rather than performing it; the host
/// applies drained entries against its own state, which keeps the ledger
/// free of references into the arena or the montage tables.
#[derive(Clone, Debug)]
pub enum RollbackAction {
    /// Revert every attribute write and active effect the journal recorded.
    RevertEffects(EffectJournal),

    /// Stop a montage that was played speculatively. The blend time is the
    /// fixed rejection fade, not the montage's own blend-out.
    StopMontage {
        character: CharacterId,
        mesh: MeshId,
        montage: MontageHandle,
    },
}

/// A resolved-negatively key together with its undo work.
#[derive(Debug)]
pub struct RejectionEntry {
    pub key: PredictionKey,
    pub resolution: KeyResolution,
    pub rollbacks: Vec<RollbackAction>,
}

#[derive(Debug)]
struct KeyEntry {
    key: PredictionKey,
    resolved: Option<KeyResolution>,
    rollbacks: Vec<RollbackAction>,
}

/// Issues, tracks, and resolves prediction keys.
///
/// Exactly one resolution takes effect per key. A second resolution attempt
/// is a logged no-op; registering rollback work under a resolved or unknown
/// key silently drops it (the speculation it belonged to is already gone).
#[derive(Debug, Default)]
pub struct PredictionLedger {
    entries: BTreeMap<u64, KeyEntry>,
    queue: Vec<RejectionEntry>,
    next_id: u64,
    confirmed: u64,
    rejected: u64,
    expired: u64,
}

impl PredictionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh key for `connection`, valid for `window` ticks.
    pub fn issue(&mut self, connection: ConnectionId, now: Tick, window: u64) -> PredictionKey {
        let key = PredictionKey {
            id: self.next_id,
            connection,
            expires_at: now + window,
        };
        self.next_id += 1;
        self.entries.insert(
            key.id,
            KeyEntry {
                key,
                resolved: None,
                rollbacks: Vec::new(),
            },
        );
        tracing::trace!(key = key.id, %connection, "issued prediction key");
        key
    }

    /// Whether `key` may still tag new speculative work.
    pub fn can_predict(&self, key: &PredictionKey, now: Tick) -> bool {
        self.entries
            .get(&key.id)
            .is_some_and(|entry| entry.resolved.is_none() && entry.key.is_valid_for_prediction(now))
    }

    /// Registers undo work under a pending key. Dropped silently when the
    /// key is unknown or already resolved.
    pub fn register_rollback(&mut self, key: &PredictionKey, action: RollbackAction) {
        match self.entries.get_mut(&key.id) {
            Some(entry) if entry.resolved.is_none() => entry.rollbacks.push(action),
            _ => {
                tracing::trace!(key = key.id, "dropping rollback for resolved key");
            }
        }
    }

    /// Server agreed: speculative state becomes real, undo work is dropped.
    ///
    /// Returns whether the resolution took effect. A second resolution for
    /// an already-resolved key is a logged no-op, not a failure.
    pub fn confirm(&mut self, key_id: u64) -> bool {
        match self.resolve(key_id, KeyResolution::Confirmed) {
            Ok(_) => {
                self.confirmed += 1;
                true
            }
            Err(err) => {
                tracing::warn!(key = key_id, %err, "confirm ignored");
                false
            }
        }
    }

    /// Server disagreed: the key's undo work moves to the rejection queue.
    ///
    /// Returns whether the resolution took effect.
    pub fn reject(&mut self, key_id: u64) -> bool {
        match self.resolve(key_id, KeyResolution::Rejected) {
            Ok(entry) => {
                self.rejected += 1;
                self.queue.push(entry);
                true
            }
            Err(err) => {
                tracing::warn!(key = key_id, %err, "reject ignored");
                false
            }
        }
    }

    /// Expires every pending key whose validity window has elapsed.
    ///
    /// Expired keys roll back exactly like rejected ones; the distinct
    /// resolution only feeds diagnostics.
    pub fn tick(&mut self, now: Tick) {
        let overdue: Vec<u64> = self
            .entries
            .values()
            .filter(|entry| entry.resolved.is_none() && !entry.key.is_valid_for_prediction(now))
            .map(|entry| entry.key.id)
            .collect();

        for key_id in overdue {
            if let Ok(entry) = self.resolve(key_id, KeyResolution::Expired) {
                tracing::warn!(key = key_id, %now, "prediction key expired unresolved");
                self.expired += 1;
                self.queue.push(entry);
            }
        }
    }

    /// Takes everything queued for rollback. Called once per update tick by
    /// the host, which applies the entries against its state.
    pub fn drain_rejections(&mut self) -> Vec<RejectionEntry> {
        std::mem::take(&mut self.queue)
    }

    /// Resolution counters for diagnostics: (confirmed, rejected, expired).
    pub fn counters(&self) -> (u64, u64, u64) {
        (self.confirmed, self.rejected, self.expired)
    }

    fn resolve(
        &mut self,
        key_id: u64,
        resolution: KeyResolution,
    ) -> Result<RejectionEntry, RuntimeError> {
        let entry = self
            .entries
            .get_mut(&key_id)
            .ok_or(RuntimeError::KeyAlreadyResolved(key_id))?;
        if entry.resolved.is_some() {
            return Err(RuntimeError::KeyAlreadyResolved(key_id));
        }
        entry.resolved = Some(resolution);

        Ok(RejectionEntry {
            key: entry.key,
            resolution,
            rollbacks: std::mem::take(&mut entry.rollbacks),
        })
    }
}
