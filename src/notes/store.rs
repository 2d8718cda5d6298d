//! Ordered note collection for one piece

use super::event::NoteEvent;
use crate::error::AnalysisError;

/// All note events of one piece, ordered by onset
///
/// Built once per analysis run and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteSequence {
    notes: Vec<NoteEvent>,
}

impl NoteSequence {
    /// Create a sequence from notes in any order
    ///
    /// Notes are sorted by onset, then pitch, then offset so identical input
    /// sets always produce identical sequences.
    pub fn new(mut notes: Vec<NoteEvent>) -> Self {
        notes.sort_by(|a, b| {
            a.start()
                .total_cmp(&b.start())
                .then(a.pitch().cmp(&b.pitch()))
                .then(a.end().total_cmp(&b.end()))
        });
        Self { notes }
    }

    /// Notes in onset order
    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    /// Iterate notes in onset order
    pub fn iter(&self) -> std::slice::Iter<'_, NoteEvent> {
        self.notes.iter()
    }

    /// Number of notes
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// True when the piece has no notes
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Latest note offset in seconds (0.0 for an empty piece)
    pub fn end_time(&self) -> f32 {
        self.notes.iter().map(|n| n.end()).fold(0.0f32, f32::max)
    }

    /// Onset times in ascending order
    pub fn onsets(&self) -> Vec<f32> {
        self.notes.iter().map(|n| n.start()).collect()
    }

    /// Keep only notes accepted by `keep`
    pub fn retain<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&NoteEvent) -> bool,
    {
        Self {
            notes: self.notes.iter().filter(|n| keep(n)).copied().collect(),
        }
    }

    /// Every note moved by `semitones`
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if any note leaves the MIDI range.
    pub fn transposed(&self, semitones: i32) -> Result<Self, AnalysisError> {
        let notes = self
            .notes
            .iter()
            .map(|n| n.transposed(semitones))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(notes))
    }
}

impl From<Vec<NoteEvent>> for NoteSequence {
    fn from(notes: Vec<NoteEvent>) -> Self {
        Self::new(notes)
    }
}

impl FromIterator<NoteEvent> for NoteSequence {
    fn from_iter<I: IntoIterator<Item = NoteEvent>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a NoteSequence {
    type Item = &'a NoteEvent;
    type IntoIter = std::slice::Iter<'a, NoteEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.notes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(pitch: u8, start: f32, end: f32) -> NoteEvent {
        NoteEvent::new(pitch, start, end, 100).unwrap()
    }

    #[test]
    fn test_sorted_by_onset() {
        let seq = NoteSequence::new(vec![note(64, 2.0, 3.0), note(60, 0.0, 1.0), note(55, 0.0, 4.0)]);
        let pitches: Vec<u8> = seq.iter().map(|n| n.pitch()).collect();
        assert_eq!(pitches, vec![55, 60, 64]);
        assert_eq!(seq.onsets(), vec![0.0, 0.0, 2.0]);
    }

    #[test]
    fn test_end_time() {
        assert_eq!(NoteSequence::default().end_time(), 0.0);
        let seq = NoteSequence::new(vec![note(60, 0.0, 5.0), note(64, 2.0, 3.0)]);
        assert_eq!(seq.end_time(), 5.0);
    }

    #[test]
    fn test_transposed() {
        let seq = NoteSequence::new(vec![note(60, 0.0, 1.0), note(64, 0.0, 1.0)]);
        let up = seq.transposed(2).unwrap();
        let pitches: Vec<u8> = up.iter().map(|n| n.pitch()).collect();
        assert_eq!(pitches, vec![62, 66]);
        assert!(seq.transposed(100).is_err());
    }

    #[test]
    fn test_retain() {
        let seq = NoteSequence::new(vec![note(60, 0.0, 1.0), note(64, 0.0, 0.05)]);
        let long = seq.retain(|n| n.duration() >= 0.1);
        assert_eq!(long.len(), 1);
        assert_eq!(long.notes()[0].pitch(), 60);
    }
}
