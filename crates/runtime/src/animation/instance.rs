//! Deterministic montage playback state for one mesh.
//!
//! Stands in for the engine-side animator: it models position, play rate,
//! section links, and stopping, advanced by explicit `advance` calls so the
//! authority and every replica step playback identically.

use arrayvec::ArrayVec;

use super::montage::{Montage, MontageHandle, MAX_MONTAGE_SECTIONS};

/// Playback state of the montage currently loaded on a mesh.
#[derive(Clone, Debug, Default)]
pub struct AnimInstance {
    montage: Option<Montage>,
    position: f32,
    play_rate: f32,
    stopped: bool,
    /// Blend time used by the most recent stop, kept for observers.
    last_blend_out: Option<f32>,
    /// Section links installed by set_next_section: (from, to) indices.
    links: ArrayVec<(usize, usize), MAX_MONTAGE_SECTIONS>,
}

impl AnimInstance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts playing a montage from position zero.
    ///
    /// Returns the playback duration, or a negative sentinel when the
    /// montage cannot play (zero length or non-positive rate).
    pub fn play(&mut self, montage: Montage, play_rate: f32) -> f32 {
        if montage.length <= 0.0 || play_rate <= 0.0 {
            return -1.0;
        }

        let duration = montage.length / play_rate;
        self.montage = Some(montage);
        self.position = 0.0;
        self.play_rate = play_rate;
        self.stopped = false;
        self.last_blend_out = None;
        self.links.clear();
        duration
    }

    /// The montage loaded on this mesh while it is actively playing.
    pub fn current_montage(&self) -> Option<&Montage> {
        if self.stopped {
            return None;
        }
        self.montage.as_ref()
    }

    pub fn is_playing(&self, handle: MontageHandle) -> bool {
        self.current_montage().is_some_and(|m| m.handle == handle)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped || self.montage.is_none()
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    /// Snaps playback to a position. Reconciliation path; no policy beyond
    /// clamping into the clip.
    pub fn set_position(&mut self, position: f32) {
        if let Some(montage) = &self.montage {
            self.position = position.clamp(0.0, montage.length);
        }
    }

    pub fn play_rate(&self) -> f32 {
        self.play_rate
    }

    pub fn set_play_rate(&mut self, play_rate: f32) {
        if play_rate > 0.0 {
            self.play_rate = play_rate;
        }
    }

    /// Index of the section playback is currently inside.
    pub fn current_section(&self) -> Option<usize> {
        let montage = self.current_montage()?;
        montage.section_index_at(self.position)
    }

    /// Jumps playback to the start of a named section.
    pub fn jump_to_section(&mut self, name: &str) -> bool {
        let Some(montage) = self.current_montage() else {
            return false;
        };
        let Some(index) = montage.section_index(name) else {
            return false;
        };
        // Lookup cannot fail for an index we just resolved.
        let start = montage.section_start(index).unwrap_or(0.0);
        self.position = start;
        true
    }

    /// Links `from` to `to`: when playback crosses the end of `from` it
    /// continues at the start of `to` instead of running on.
    pub fn set_next_section(&mut self, from: &str, to: &str) -> bool {
        let Some(montage) = self.current_montage() else {
            return false;
        };
        let (Some(from), Some(to)) = (montage.section_index(from), montage.section_index(to))
        else {
            return false;
        };

        if let Some(link) = self.links.iter_mut().find(|(f, _)| *f == from) {
            link.1 = to;
        } else {
            self.links.push((from, to));
        }
        true
    }

    /// Advances playback by `dt` seconds, following section links and
    /// stopping with the montage's own blend-out when the clip runs out.
    pub fn advance(&mut self, dt: f32) {
        if self.is_stopped() {
            return;
        }
        let Some(montage) = self.montage.clone() else {
            return;
        };

        let mut remaining = dt * self.play_rate;
        while remaining > 0.0 {
            let section = montage.section_index_at(self.position);
            let section_end = match section {
                Some(index) => {
                    montage.section_start(index).unwrap_or(0.0) + montage.section_length(index)
                }
                None => montage.length,
            };

            let to_end = section_end - self.position;
            if remaining < to_end {
                self.position += remaining;
                return;
            }

            remaining -= to_end;
            let link = section.and_then(|index| {
                self.links
                    .iter()
                    .find(|(from, _)| *from == index)
                    .map(|(_, to)| *to)
            });
            match link {
                Some(target) => {
                    self.position = montage.section_start(target).unwrap_or(0.0);
                }
                None if section_end >= montage.length => {
                    self.position = montage.length;
                    self.stop(montage.blend_out);
                    return;
                }
                None => {
                    self.position = section_end;
                }
            }
        }
    }

    /// Stops playback with the given blend time. Stopping an already
    /// stopped instance changes nothing.
    pub fn stop(&mut self, blend_out: f32) {
        if self.is_stopped() {
            return;
        }
        self.stopped = true;
        self.last_blend_out = Some(blend_out);
    }

    /// Blend time of the most recent stop, if any.
    pub fn last_blend_out(&self) -> Option<f32> {
        self.last_blend_out
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
    fn play_returns_rate_scaled_duration() {
        let mut instance = AnimInstance::new();
        assert_eq!(instance.play(montage(), 2.0), 1.0);
        assert!(!instance.is_stopped());
    }

    #[test]
    fn play_rejects_non_positive_rate() {
        let mut instance = AnimInstance::new();
        assert_eq!(instance.play(montage(), 0.0), -1.0);
        assert!(instance.is_stopped());
    }

    #[test]
    fn advance_follows_section_links() {
        let mut instance = AnimInstance::new();
        instance.play(montage(), 1.0);
        assert!(instance.set_next_section("loop", "loop"));

        // Two seconds of playback would run off the clip end, but the loop
        // section feeds back into itself.
        instance.advance(2.0);
        assert!(!instance.is_stopped());
        assert_eq!(instance.current_section(), Some(1));
    }

    #[test]
    fn advance_past_end_stops_with_configured_blend() {
        let mut instance = AnimInstance::new();
        instance.play(montage(), 1.0);
        instance.advance(5.0);
        assert!(instance.is_stopped());
        assert_eq!(instance.last_blend_out(), Some(0.4));
    }

    #[test]
    fn double_stop_keeps_first_blend() {
        let mut instance = AnimInstance::new();
        instance.play(montage(), 1.0);
        instance.stop(0.1);
        instance.stop(0.9);
        assert_eq!(instance.last_blend_out(), Some(0.1));
    }

    #[test]
    fn jump_to_section_moves_position() {
        let mut instance = AnimInstance::new();
        instance.play(montage(), 1.0);
        assert!(instance.jump_to_section("end"));
        assert_eq!(instance.position(), 1.6);
        assert!(!instance.jump_to_section("missing"));
    }
}
