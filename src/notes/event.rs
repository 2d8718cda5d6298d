//! Single transcribed note

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Highest valid MIDI pitch / velocity value
pub const MIDI_MAX: u8 = 127;

/// Pitch class (0 = C, 1 = C#, ..., 11 = B) of a MIDI pitch
#[inline]
pub fn pitch_class(pitch: u8) -> usize {
    (pitch % 12) as usize
}

/// One detected note: MIDI pitch, onset/offset in seconds and velocity
///
/// Fields are private so a constructed event always satisfies
/// `pitch <= 127`, `velocity <= 127`, `0 <= start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoteEvent {
    pitch: u8,
    start: f32,
    end: f32,
    velocity: u8,
}

impl NoteEvent {
    /// Create a validated note event
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if pitch or velocity exceed 127,
    /// a time is not finite, `start < 0`, or `end <= start`.
    pub fn new(pitch: u8, start: f32, end: f32, velocity: u8) -> Result<Self, AnalysisError> {
        if pitch > MIDI_MAX {
            return Err(AnalysisError::InvalidInput(format!(
                "Pitch {} out of MIDI range [0, 127]",
                pitch
            )));
        }
        if velocity > MIDI_MAX {
            return Err(AnalysisError::InvalidInput(format!(
                "Velocity {} out of MIDI range [0, 127]",
                velocity
            )));
        }
        if !start.is_finite() || !end.is_finite() {
            return Err(AnalysisError::InvalidInput(format!(
                "Note times must be finite, got [{}, {}]",
                start, end
            )));
        }
        if start < 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "Note start must be >= 0, got {}",
                start
            )));
        }
        if end <= start {
            return Err(AnalysisError::InvalidInput(format!(
                "Note end ({}) must be after start ({})",
                end, start
            )));
        }

        Ok(Self {
            pitch,
            start,
            end,
            velocity,
        })
    }

    /// MIDI pitch
    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    /// Onset in seconds
    pub fn start(&self) -> f32 {
        self.start
    }

    /// Offset in seconds
    pub fn end(&self) -> f32 {
        self.end
    }

    /// MIDI velocity
    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    /// Sounding duration in seconds
    pub fn duration(&self) -> f32 {
        self.end - self.start
    }

    /// Pitch class of this note
    pub fn pitch_class(&self) -> usize {
        pitch_class(self.pitch)
    }

    /// Seconds this note sounds inside `[window_start, window_end)`
    ///
    /// Zero when the note lies entirely outside the span.
    pub fn overlap(&self, window_start: f32, window_end: f32) -> f32 {
        if self.start < window_end && self.end > window_start {
            (self.end.min(window_end) - self.start.max(window_start)).max(0.0)
        } else {
            0.0
        }
    }

    /// Same note moved by `semitones`
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if the result leaves [0, 127].
    pub fn transposed(&self, semitones: i32) -> Result<Self, AnalysisError> {
        let pitch = self.pitch as i32 + semitones;
        if !(0..=MIDI_MAX as i32).contains(&pitch) {
            return Err(AnalysisError::InvalidInput(format!(
                "Transposing pitch {} by {} leaves MIDI range",
                self.pitch, semitones
            )));
        }
        Ok(Self {
            pitch: pitch as u8,
            ..*self
        })
    }
}

// Deserialization goes through `new` so serialized input is validated too.
impl<'de> Deserialize<'de> for NoteEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawNote {
            pitch: u8,
            start: f32,
            end: f32,
            velocity: u8,
        }

        let raw = RawNote::deserialize(deserializer)?;
        NoteEvent::new(raw.pitch, raw.start, raw.end, raw.velocity).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid() {
        let note = NoteEvent::new(60, 0.5, 1.5, 100).unwrap();
        assert_eq!(note.pitch(), 60);
        assert_eq!(note.pitch_class(), 0);
        assert!((note.duration() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_new_rejects_invalid() {
        assert!(NoteEvent::new(128, 0.0, 1.0, 100).is_err());
        assert!(NoteEvent::new(60, 0.0, 1.0, 200).is_err());
        assert!(NoteEvent::new(60, -0.1, 1.0, 100).is_err());
        assert!(NoteEvent::new(60, 1.0, 1.0, 100).is_err());
        assert!(NoteEvent::new(60, 2.0, 1.0, 100).is_err());
        assert!(NoteEvent::new(60, 0.0, f32::NAN, 100).is_err());
    }

    #[test]
    fn test_pitch_class() {
        assert_eq!(pitch_class(60), 0); // C4
        assert_eq!(pitch_class(55), 7); // G3
        assert_eq!(pitch_class(66), 6); // F#4
        assert_eq!(pitch_class(127), 7);
    }

    #[test]
    fn test_overlap() {
        let note = NoteEvent::new(60, 1.0, 3.0, 100).unwrap();
        assert!((note.overlap(0.0, 2.0) - 1.0).abs() < 1e-6);
        assert!((note.overlap(1.5, 2.5) - 1.0).abs() < 1e-6);
        assert!((note.overlap(0.0, 4.0) - 2.0).abs() < 1e-6);
        // Touching edges do not overlap
        assert_eq!(note.overlap(3.0, 4.0), 0.0);
        assert_eq!(note.overlap(0.0, 1.0), 0.0);
    }

    #[test]
    fn test_transposed() {
        let note = NoteEvent::new(60, 0.0, 1.0, 90).unwrap();
        let up = note.transposed(7).unwrap();
        assert_eq!(up.pitch(), 67);
        assert_eq!(up.velocity(), 90);
        assert!(note.transposed(-61).is_err());
        assert!(note.transposed(68).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<NoteEvent, _> =
            serde_json::from_str(r#"{"pitch": 62, "start": 0.0, "end": 0.5, "velocity": 80}"#);
        assert!(ok.is_ok());

        let bad: Result<NoteEvent, _> =
            serde_json::from_str(r#"{"pitch": 62, "start": 1.0, "end": 0.5, "velocity": 80}"#);
        assert!(bad.is_err());
    }
}
