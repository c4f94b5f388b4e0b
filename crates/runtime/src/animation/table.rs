//! Per-mesh montage bookkeeping.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ability::AbilityId;

use super::instance::AnimInstance;
use super::montage::{Montage, MontageHandle};

/// Blend time used to kill a montage whose prediction key was rejected.
/// Deliberately short and fixed: the rollback must be visually immediate
/// regardless of the montage's own blend-out.
pub const MONTAGE_PREDICTION_REJECT_FADETIME: f32 = 0.25;

/// Tolerance for montage playback position correction on simulated proxies.
/// Drift below this keeps local playback; beyond it, position snaps to the
/// client-reported value.
pub const REPLAY_ERROR_THRESHOLD: f32 = 0.5;

/// Identifies one skeletal mesh on a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MeshId(pub u32);

impl fmt::Display for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mesh:{}", self.0)
    }
}

/// One entry per distinct mesh: the local animator plus the ability that
/// currently owns the animating state.
#[derive(Clone, Debug)]
struct MeshEntry {
    mesh: MeshId,
    animator: Option<AnimInstance>,
    owning_ability: Option<AbilityId>,
}

/// Per-character table of locally-playing montages.
///
/// Entries are created lazily on first touch and never duplicated: lookup
/// is always by `mesh_id`. At most one ability owns the animating state for
/// a given mesh at a time; when that ability ends, [`clear_ability`]
/// releases every mesh it held.
///
/// [`clear_ability`]: MontageTable::clear_ability
#[derive(Clone, Debug, Default)]
pub struct MontageTable {
    entries: Vec<MeshEntry>,
}

impl MontageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `montage` on `mesh` under `ability`.
    ///
    /// Returns the playback duration, or a negative sentinel when the mesh
    /// has no animator or the montage cannot start. If a different ability
    /// was previously animating this mesh it is not force-stopped here: it
    /// has already received its interruption notice and is expected to end
    /// itself.
    pub fn play(
        &mut self,
        mesh: MeshId,
        ability: AbilityId,
        montage: &Montage,
        play_rate: f32,
        start_section: Option<&str>,
    ) -> f32 {
        let duration = self.start_playback(mesh, montage, play_rate, start_section);
        if duration > 0.0 {
            let entry = self.entry_mut(mesh);
            if let Some(previous) = entry.owning_ability
                && previous != ability
            {
                tracing::trace!(%mesh, %previous, %ability, "mesh changed animating ability");
            }
            entry.owning_ability = Some(ability);
        }
        duration
    }

    /// Starts `montage` on `mesh` for pure playback replay: no owning
    /// ability, no prediction. Observer clients use this path.
    pub fn play_simulated(
        &mut self,
        mesh: MeshId,
        montage: &Montage,
        play_rate: f32,
        start_section: Option<&str>,
    ) -> f32 {
        self.start_playback(mesh, montage, play_rate, start_section)
    }

    /// Stops the mesh's current montage if it is not already stopped.
    ///
    /// The blend time defaults to the montage's own configured blend-out
    /// unless overridden. Stopping an already stopped mesh is a no-op.
    pub fn stop(&mut self, mesh: MeshId, blend_override: Option<f32>) {
        let entry = self.entry_mut(mesh);
        let Some(animator) = entry.animator.as_mut() else {
            return;
        };
        let Some(montage) = animator.current_montage() else {
            return;
        };
        let blend_out = blend_override.unwrap_or(montage.blend_out);
        animator.stop(blend_out);
    }

    /// Applies [`stop`](MontageTable::stop) to every mesh entry.
    pub fn stop_all(&mut self, blend_override: Option<f32>) {
        let meshes: Vec<MeshId> = self.entries.iter().map(|entry| entry.mesh).collect();
        for mesh in meshes {
            self.stop(mesh, blend_override);
        }
    }

    /// Stops the mesh only if `montage` is still what it is playing. The
    /// prediction rollback path uses this so a montage that legitimately
    /// replaced the rejected one is left alone.
    pub fn stop_if_current(
        &mut self,
        mesh: MeshId,
        montage: MontageHandle,
        blend_override: Option<f32>,
    ) {
        let entry = self.entry_mut(mesh);
        let playing = entry
            .animator
            .as_ref()
            .is_some_and(|animator| animator.is_playing(montage));
        if playing {
            self.stop(mesh, blend_override);
        }
    }

    /// Jumps the mesh's current montage to a named section. No-op without
    /// an active montage.
    pub fn jump_to_section(&mut self, mesh: MeshId, section: &str) {
        if let Some(animator) = self.animator_mut(mesh) {
            animator.jump_to_section(section);
        }
    }

    /// Links two sections of the mesh's current montage. No-op without an
    /// active montage.
    pub fn set_next_section(&mut self, mesh: MeshId, from: &str, to: &str) {
        if let Some(animator) = self.animator_mut(mesh) {
            animator.set_next_section(from, to);
        }
    }

    /// Changes the play rate of the mesh's current montage. No-op without
    /// an active montage.
    pub fn set_play_rate(&mut self, mesh: MeshId, play_rate: f32) {
        if let Some(animator) = self.animator_mut(mesh) {
            if animator.current_montage().is_some() {
                animator.set_play_rate(play_rate);
            }
        }
    }

    /// Clears animation ownership on every mesh held by `ability`. Called
    /// whenever an ability ends, normally or cancelled.
    pub fn clear_ability(&mut self, ability: AbilityId) {
        for entry in &mut self.entries {
            if entry.owning_ability == Some(ability) {
                entry.owning_ability = None;
            }
        }
    }

    /// Advances every playing animator by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        for entry in &mut self.entries {
            if let Some(animator) = entry.animator.as_mut() {
                animator.advance(dt);
            }
        }
    }

    /// Reconciles the mesh against a client-reported montage position.
    ///
    /// If the reported montage matches the current one, the section
    /// transition is applied; then the locally computed section is compared
    /// against the client's. On divergence, or on position drift beyond
    /// [`REPLAY_ERROR_THRESHOLD`], local playback snaps to the reported
    /// position.
    pub fn reconcile(
        &mut self,
        mesh: MeshId,
        client_montage: MontageHandle,
        client_position: f32,
        from_section: &str,
        to_section: &str,
    ) {
        let Some(animator) = self.animator_mut(mesh) else {
            return;
        };
        let Some(montage) = animator.current_montage() else {
            return;
        };
        if montage.handle != client_montage {
            return;
        }

        let from_index = montage.section_index(from_section);
        let client_section = montage.section_index_at(client_position);
        animator.set_next_section(from_section, to_section);

        let local_section = animator.current_section();
        let diverged = local_section != client_section || local_section != from_index;
        let drifted = (animator.position() - client_position).abs() > REPLAY_ERROR_THRESHOLD;
        if diverged || drifted {
            tracing::debug!(
                %mesh,
                %client_montage,
                client_position,
                "snapping simulated montage to client position"
            );
            animator.set_position(client_position);
        }
    }

    // ===== queries =====

    /// Handle of the montage currently playing on `mesh`.
    pub fn current_montage(&self, mesh: MeshId) -> Option<MontageHandle> {
        self.animator(mesh)?
            .current_montage()
            .map(|montage| montage.handle)
    }

    /// Name of the section currently playing on `mesh`.
    pub fn current_section(&self, mesh: MeshId) -> Option<&'static str> {
        let animator = self.animator(mesh)?;
        let montage = animator.current_montage()?;
        montage.section_name(animator.current_section()?)
    }

    /// The ability owning the animating state of `mesh`.
    pub fn owning_ability(&self, mesh: MeshId) -> Option<AbilityId> {
        self.entries
            .iter()
            .find(|entry| entry.mesh == mesh)?
            .owning_ability
    }

    /// Whether `ability` owns the animating state of any mesh.
    pub fn is_animating_ability(&self, ability: AbilityId) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.owning_ability == Some(ability))
    }

    /// Blend time used by the most recent stop on `mesh`.
    pub fn last_blend_out(&self, mesh: MeshId) -> Option<f32> {
        self.animator(mesh)?.last_blend_out()
    }

    /// Playback position of the mesh's current montage.
    pub fn montage_position(&self, mesh: MeshId) -> Option<f32> {
        let animator = self.animator(mesh)?;
        animator.current_montage()?;
        Some(animator.position())
    }

    /// Seconds of the current section left to play, at rate 1. Returns a
    /// negative sentinel when nothing is playing.
    pub fn section_time_left(&self, mesh: MeshId) -> f32 {
        let Some(animator) = self.animator(mesh) else {
            return -1.0;
        };
        let Some(montage) = animator.current_montage() else {
            return -1.0;
        };

        match animator.current_section() {
            Some(index) => {
                let start = montage.section_start(index).unwrap_or(0.0);
                start + montage.section_length(index) - animator.position()
            }
            None => montage.length - animator.position(),
        }
    }

    /// Snaps playback position on the mesh's current montage. Replication
    /// correction path only.
    pub(crate) fn snap_position(&mut self, mesh: MeshId, position: f32) {
        if let Some(animator) = self.animator_mut(mesh) {
            animator.set_position(position);
        }
    }

    pub fn is_stopped(&self, mesh: MeshId) -> bool {
        self.animator(mesh).is_none_or(|animator| animator.is_stopped())
    }

    /// Detaches the animator from a mesh (destroyed or not yet spawned).
    /// Subsequent plays on it return the negative sentinel.
    pub fn detach_animator(&mut self, mesh: MeshId) {
        self.entry_mut(mesh).animator = None;
    }

    // ===== internals =====

    fn start_playback(
        &mut self,
        mesh: MeshId,
        montage: &Montage,
        play_rate: f32,
        start_section: Option<&str>,
    ) -> f32 {
        let entry = self.entry_mut(mesh);
        let Some(animator) = entry.animator.as_mut() else {
            return -1.0;
        };

        let duration = animator.play(montage.clone(), play_rate);
        if duration > 0.0
            && let Some(section) = start_section
        {
            animator.jump_to_section(section);
        }
        duration
    }

    /// Lookup-or-create by mesh id. Exactly one entry ever exists per mesh.
    fn entry_mut(&mut self, mesh: MeshId) -> &mut MeshEntry {
        if let Some(index) = self.entries.iter().position(|entry| entry.mesh == mesh) {
            return &mut self.entries[index];
        }
        self.entries.push(MeshEntry {
            mesh,
            animator: Some(AnimInstance::new()),
            owning_ability: None,
        });
        self.entries.last_mut().expect("entry just pushed")
    }

    fn animator(&self, mesh: MeshId) -> Option<&AnimInstance> {
        self.entries
            .iter()
            .find(|entry| entry.mesh == mesh)?
            .animator
            .as_ref()
    }

    fn animator_mut(&mut self, mesh: MeshId) -> Option<&mut AnimInstance> {
        self.entries
            .iter_mut()
            .find(|entry| entry.mesh == mesh)?
            .animator
            .as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn montage() -> Montage {
        Montage::new(MontageHandle(1), 2.0, 0.4)
            .with_section("start", 0.0)
            .with_section("loop", 0.8)
            .with_section("end", 1.6)
    }

    #[test]
    fn play_records_owning_ability() {
        let mut table = MontageTable::new();
        let duration = table.play(MeshId(0), AbilityId(1), &montage(), 1.0, None);
        assert_eq!(duration, 2.0);
        assert_eq!(table.owning_ability(MeshId(0)), Some(AbilityId(1)));
        assert_eq!(table.current_montage(MeshId(0)), Some(MontageHandle(1)));
    }

    #[test]
    fn play_without_animator_returns_sentinel() {
        let mut table = MontageTable::new();
        table.detach_animator(MeshId(0));
        let duration = table.play(MeshId(0), AbilityId(1), &montage(), 1.0, None);
        assert!(duration < 0.0);
        assert_eq!(table.owning_ability(MeshId(0)), None);
    }

    #[test]
    fn stop_defaults_to_montage_blend_out() {
        let mut table = MontageTable::new();
        table.play(MeshId(0), AbilityId(1), &montage(), 1.0, None);
        table.stop(MeshId(0), None);
        assert_eq!(table.last_blend_out(MeshId(0)), Some(0.4));
    }

    #[test]
    fn stop_on_stopped_mesh_is_a_no_op() {
        let mut table = MontageTable::new();
        table.play(MeshId(0), AbilityId(1), &montage(), 1.0, None);
        table.stop(MeshId(0), Some(0.1));
        table.stop(MeshId(0), Some(0.9));
        assert_eq!(table.last_blend_out(MeshId(0)), Some(0.1));
    }

    #[test]
    fn stop_honors_override() {
        let mut table = MontageTable::new();
        table.play(MeshId(0), AbilityId(1), &montage(), 1.0, None);
        table.stop(MeshId(0), Some(0.05));
        assert_eq!(table.last_blend_out(MeshId(0)), Some(0.05));
    }

    #[test]
    fn clear_ability_releases_every_held_mesh() {
        let mut table = MontageTable::new();
        table.play(MeshId(0), AbilityId(1), &montage(), 1.0, None);
        table.play(MeshId(1), AbilityId(1), &montage(), 1.0, None);
        table.play(MeshId(2), AbilityId(2), &montage(), 1.0, None);

        table.clear_ability(AbilityId(1));
        assert_eq!(table.owning_ability(MeshId(0)), None);
        assert_eq!(table.owning_ability(MeshId(1)), None);
        assert_eq!(table.owning_ability(MeshId(2)), Some(AbilityId(2)));
    }

    #[test]
    fn playback_mutators_are_no_ops_without_a_montage() {
        let mut table = MontageTable::new();
        table.jump_to_section(MeshId(0), "loop");
        table.set_next_section(MeshId(0), "loop", "end");
        table.set_play_rate(MeshId(0), 2.0);
        assert_eq!(table.current_montage(MeshId(0)), None);
        assert_eq!(table.section_time_left(MeshId(0)), -1.0);

        // Same after the montage has stopped.
        table.play(MeshId(0), AbilityId(1), &montage(), 1.0, None);
        table.stop(MeshId(0), None);
        table.jump_to_section(MeshId(0), "loop");
        assert!(table.is_stopped(MeshId(0)));
    }

    #[test]
    fn section_time_left_counts_down() {
        let mut table = MontageTable::new();
        table.play(MeshId(0), AbilityId(1), &montage(), 1.0, None);
        // In "start" (0.0..0.8) at position 0.
        assert!((table.section_time_left(MeshId(0)) - 0.8).abs() < 1e-6);

        table.advance(0.5);
        assert!((table.section_time_left(MeshId(0)) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn stop_all_stops_every_mesh() {
        let mut table = MontageTable::new();
        table.play(MeshId(0), AbilityId(1), &montage(), 1.0, None);
        table.play(MeshId(1), AbilityId(2), &montage(), 1.0, None);

        table.stop_all(Some(0.1));
        assert!(table.is_stopped(MeshId(0)));
        assert!(table.is_stopped(MeshId(1)));
        assert_eq!(table.last_blend_out(MeshId(1)), Some(0.1));
    }

    #[test]
    fn simulated_play_records_no_ability() {
        let mut table = MontageTable::new();
        let duration = table.play_simulated(MeshId(0), &montage(), 1.0, Some("loop"));
        assert_eq!(duration, 2.0);
        assert_eq!(table.owning_ability(MeshId(0)), None);
        assert_eq!(table.current_section(MeshId(0)), Some("loop"));
    }

    #[test]
    fn previous_ability_is_not_force_stopped() {
        let mut table = MontageTable::new();
        table.play(MeshId(0), AbilityId(1), &montage(), 1.0, None);
        table.play(MeshId(0), AbilityId(2), &montage(), 1.0, None);
        // Ownership moves; the first ability is responsible for ending
        // itself after its interruption notice.
        assert_eq!(table.owning_ability(MeshId(0)), Some(AbilityId(2)));
        assert!(!table.is_stopped(MeshId(0)));
    }

    #[test]
    fn reconcile_snaps_on_section_divergence() {
        let mut table = MontageTable::new();
        table.play(MeshId(0), AbilityId(1), &montage(), 1.0, None);
        // Local playback sits in "start"; the client reports "end".
        table.reconcile(MeshId(0), MontageHandle(1), 1.7, "end", "end");
        assert_eq!(table.current_section(MeshId(0)), Some("end"));
    }

    #[test]
    fn reconcile_ignores_mismatched_montage() {
        let mut table = MontageTable::new();
        table.play(MeshId(0), AbilityId(1), &montage(), 1.0, None);
        table.reconcile(MeshId(0), MontageHandle(99), 1.7, "end", "end");
        assert_eq!(table.current_section(MeshId(0)), Some("start"));
    }

    #[test]
    fn stop_if_current_skips_replaced_montage() {
        let mut table = MontageTable::new();
        table.play(MeshId(0), AbilityId(1), &montage(), 1.0, None);
        let other = Montage::new(MontageHandle(2), 1.0, 0.2);
        table.play(MeshId(0), AbilityId(2), &other, 1.0, None);

        table.stop_if_current(MeshId(0), MontageHandle(1), Some(0.25));
        assert!(!table.is_stopped(MeshId(0)));

        table.stop_if_current(MeshId(0), MontageHandle(2), Some(0.25));
        assert!(table.is_stopped(MeshId(0)));
    }
}
