//! Authoritative montage snapshots for simulated proxies.

use serde::{Deserialize, Serialize};

use super::montage::{MontageHandle, MontageOracle};
use super::table::{MeshId, MontageTable, REPLAY_ERROR_THRESHOLD};

/// Server-authoritative counterpart of one mesh's montage state.
///
/// Broadcast to observers that are neither the server nor the predicting
/// client. Sections travel as indices into the montage's section list, so
/// the snapshot stays self-contained without carrying names over the wire.
/// Building and shipping the bytes is the transport's job; this crate only
/// applies the state transitions a delivered snapshot implies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplicatedMontageState {
    pub mesh: MeshId,

    /// Montage the authority has playing, if any.
    pub montage: Option<MontageHandle>,

    pub play_rate: f32,

    /// Authoritative playback position, used to correct drifting proxies.
    pub position: f32,

    /// Pending section link `(from, to)` as section indices.
    pub next_section: Option<(u8, u8)>,

    /// Authority stopped the montage.
    pub is_stopped: bool,
}

impl MontageTable {
    /// Applies an authoritative snapshot to this table.
    ///
    /// Simulated playback only: montages start through the simulated path
    /// (no owning ability, no prediction), stops use the montage's own
    /// blend-out, and position drift beyond [`REPLAY_ERROR_THRESHOLD`]
    /// snaps to the authoritative position.
    pub fn apply_replicated(
        &mut self,
        snapshot: &ReplicatedMontageState,
        montages: &dyn MontageOracle,
    ) {
        let mesh = snapshot.mesh;

        if snapshot.is_stopped {
            self.stop(mesh, None);
            return;
        }

        let Some(handle) = snapshot.montage else {
            self.stop(mesh, None);
            return;
        };

        let Some(montage) = montages.montage(handle) else {
            tracing::warn!(%mesh, %handle, "replicated montage missing from library");
            return;
        };

        if self.current_montage(mesh) != Some(handle) {
            let duration = self.play_simulated(mesh, montage, snapshot.play_rate, None);
            if duration <= 0.0 {
                return;
            }
        }

        self.set_play_rate(mesh, snapshot.play_rate);

        if let Some((from, to)) = snapshot.next_section
            && let (Some(from), Some(to)) = (
                montage.section_name(from as usize),
                montage.section_name(to as usize),
            )
        {
            self.set_next_section(mesh, from, to);
        }

        if let Some(local) = self.montage_position(mesh)
            && (local - snapshot.position).abs() > REPLAY_ERROR_THRESHOLD
        {
            self.snap_position(mesh, snapshot.position);
        }
    }
}
