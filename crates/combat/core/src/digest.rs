//! Deterministic state digests.
//!
//! A digest commits to every attribute record in the arena in a canonical
//! order. The authority compares the digest of its replay against the one a
//! predicting client reports to decide whether a speculative application
//! agreed with the authoritative timeline; tests use it to assert that a
//! rollback restored state byte-exactly.

use strum::IntoEnumIterator;

use crate::attribute::AttributeKind;
use crate::character::CharacterArena;

/// Computes a SHA-256 digest over the arena's attribute tables.
///
/// Characters hash in handle order and attributes in schema order, with
/// float bit patterns rather than decimal renderings, so two arenas that
/// replayed the same writes produce the same digest on any platform.
pub fn state_digest(arena: &CharacterArena) -> [u8; 32] {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();

    for character in arena.iter() {
        hasher.update(character.id.0.to_le_bytes());
        for kind in AttributeKind::iter() {
            let record = character.attributes.attribute(kind);
            hasher.update(record.base.to_bits().to_le_bytes());
            hasher.update(record.current.to_bits().to_le_bytes());
        }
    }

    hasher.finalize().into()
}
