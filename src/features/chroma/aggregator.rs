//! Duration-weighted pitch-class aggregation
//!
//! Each note contributes the time it actually sounds inside a window, so a
//! note grazing a window edge counts for little and a sustained one for a lot.

use super::profile::PitchClassProfile;
use crate::features::segmentation::Window;
use crate::notes::{NoteEvent, NoteSequence};

/// Builds pitch-class profiles for windows of one piece
///
/// Holds the onset-sorted notes plus the longest note duration so a window
/// only scans notes that can reach it.
#[derive(Debug, Clone)]
pub struct ChromaAggregator<'a> {
    notes: &'a [NoteEvent],
    longest_note: f32,
    velocity_weighting: bool,
}

impl<'a> ChromaAggregator<'a> {
    /// Create an aggregator over `notes`
    ///
    /// With `velocity_weighting`, each overlap is scaled by velocity / 127.
    pub fn new(notes: &'a NoteSequence, velocity_weighting: bool) -> Self {
        let longest_note = notes.iter().map(|n| n.duration()).fold(0.0f32, f32::max);
        Self {
            notes: notes.notes(),
            longest_note,
            velocity_weighting,
        }
    }

    /// Profile of everything sounding in `window`
    pub fn aggregate(&self, window: &Window) -> PitchClassProfile {
        let mut profile = PitchClassProfile::zero();
        if window.end <= window.start {
            return profile;
        }

        // Notes starting at or after the window end cannot overlap it, and
        // neither can notes that started more than `longest_note` before it.
        let upper = self.notes.partition_point(|n| n.start() < window.end);
        let earliest = window.start - self.longest_note;
        let lower = self.notes[..upper].partition_point(|n| n.start() < earliest);

        for note in &self.notes[lower..upper] {
            let overlap = note.overlap(window.start, window.end);
            if overlap <= 0.0 {
                continue;
            }
            let weight = if self.velocity_weighting {
                overlap * note.velocity() as f32 / 127.0
            } else {
                overlap
            };
            profile.add(note.pitch_class(), weight);
        }

        profile
    }
}

/// Profile of the notes sounding in `window`
pub fn aggregate_window(
    notes: &NoteSequence,
    window: &Window,
    velocity_weighting: bool,
) -> PitchClassProfile {
    ChromaAggregator::new(notes, velocity_weighting).aggregate(window)
}

/// Profile over the whole piece, `[0, latest note end]`
pub fn aggregate_piece(notes: &NoteSequence, velocity_weighting: bool) -> PitchClassProfile {
    let window = Window::new(0.0, notes.end_time());
    let profile = aggregate_window(notes, &window, velocity_weighting);
    log::debug!(
        "Piece profile over {:.2}s from {} notes, total weight {:.3}",
        window.end,
        notes.len(),
        profile.total()
    );
    profile
}
