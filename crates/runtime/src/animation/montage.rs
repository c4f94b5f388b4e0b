//! Montage definitions: playable clips with named sections.

use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// Identifies a montage asset in the host's content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MontageHandle(pub u32);

impl fmt::Display for MontageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "montage:{}", self.0)
    }
}

/// A named section and the position it starts at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MontageSection {
    pub name: &'static str,
    pub start: f32,
}

/// Maximum number of named sections per montage.
pub const MAX_MONTAGE_SECTIONS: usize = 8;

/// A playable animation clip with named sections.
///
/// Montages are content, like effect definitions: hosts register them in a
/// [`MontageLibrary`] (or any [`MontageOracle`]) and the replication path
/// resolves handles through it. Sections must be listed in ascending start
/// order, the first at position zero.
#[derive(Clone, Debug, PartialEq)]
pub struct Montage {
    pub handle: MontageHandle,

    /// Total play length in seconds at play rate 1.
    pub length: f32,

    /// Blend-out time used by a normal stop.
    pub blend_out: f32,

    pub sections: ArrayVec<MontageSection, MAX_MONTAGE_SECTIONS>,
}

impl Montage {
    pub fn new(handle: MontageHandle, length: f32, blend_out: f32) -> Self {
        Self {
            handle,
            length,
            blend_out,
            sections: ArrayVec::new(),
        }
    }

    pub fn with_section(mut self, name: &'static str, start: f32) -> Self {
        debug_assert!(
            self.sections.last().is_none_or(|s| s.start < start),
            "sections must be added in ascending start order"
        );
        self.sections.push(MontageSection { name, start });
        self
    }

    /// Index of the section containing `position`, if the montage has
    /// sections at all.
    pub fn section_index_at(&self, position: f32) -> Option<usize> {
        self.sections
            .iter()
            .rposition(|section| section.start <= position)
    }

    /// Index of the section with the given name.
    pub fn section_index(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|section| section.name == name)
    }

    pub fn section_name(&self, index: usize) -> Option<&'static str> {
        self.sections.get(index).map(|section| section.name)
    }

    pub fn section_start(&self, index: usize) -> Option<f32> {
        self.sections.get(index).map(|section| section.start)
    }

    /// Length of one section: the delta to the next section's start, or to
    /// the montage end for the last one. A montage without sections reports
    /// its full length.
    pub fn section_length(&self, index: usize) -> f32 {
        let Some(section) = self.sections.get(index) else {
            return self.length;
        };
        match self.sections.get(index + 1) {
            Some(next) => next.start - section.start,
            None => self.length - section.start,
        }
    }
}

/// Read-only lookup of montage content by handle.
pub trait MontageOracle {
    fn montage(&self, handle: MontageHandle) -> Option<&Montage>;
}

/// In-memory montage registry for hosts and tests.
#[derive(Clone, Debug, Default)]
pub struct MontageLibrary {
    montages: Vec<Montage>,
}

impl MontageLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, montage: Montage) {
        debug_assert!(
            self.montage(montage.handle).is_none(),
            "montage handle registered twice"
        );
        self.montages.push(montage);
    }
}

impl MontageOracle for MontageLibrary {
    fn montage(&self, handle: MontageHandle) -> Option<&Montage> {
        self.montages.iter().find(|m| m.handle == handle)
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
    fn section_lookup_by_position() {
        let montage = montage();
        assert_eq!(montage.section_index_at(0.0), Some(0));
        assert_eq!(montage.section_index_at(0.79), Some(0));
        assert_eq!(montage.section_index_at(0.8), Some(1));
        assert_eq!(montage.section_index_at(1.9), Some(2));
    }

    #[test]
    fn section_lengths_cover_the_clip() {
        let montage = montage();
        let total: f32 = (0..montage.sections.len())
            .map(|i| montage.section_length(i))
            .sum();
        assert!((total - montage.length).abs() < 1e-6);
    }

    #[test]
    fn sectionless_montage_reports_full_length() {
        let montage = Montage::new(MontageHandle(2), 1.5, 0.25);
        assert_eq!(montage.section_index_at(0.3), None);
        assert_eq!(montage.section_length(0), 1.5);
    }
}
