//! Per-mesh animation state and its replication.
//!
//! Each character tracks, per skeletal mesh, which montage is playing
//! locally and which ability owns that playback. Observers that neither own
//! nor predict the character receive [`ReplicatedMontageState`] snapshots
//! and replay them through the same table, with a position correction path
//! for simulated proxies that drift from the authoritative timeline.

mod instance;
mod montage;
mod replicated;
mod table;

pub use instance::AnimInstance;
pub use montage::{
    MAX_MONTAGE_SECTIONS, Montage, MontageHandle, MontageLibrary, MontageOracle, MontageSection,
};
pub use replicated::ReplicatedMontageState;
pub use table::{
    MeshId, MontageTable, MONTAGE_PREDICTION_REJECT_FADETIME, REPLAY_ERROR_THRESHOLD,
};
