//! Transcription artifact filtering
//!
//! Pitch trackers emit short, quiet ghost notes around real attacks. Dropping
//! them before windowing keeps them from leaking into chord profiles.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::notes::{NoteEvent, NoteSequence};

/// Note cleanup thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteFilter {
    /// Notes quieter than this velocity are dropped (default: 0)
    pub min_velocity: u8,

    /// Notes shorter than this many seconds are dropped (default: 0.0)
    pub min_duration: f32,
}

impl Default for NoteFilter {
    fn default() -> Self {
        Self {
            min_velocity: 0,
            min_duration: 0.0,
        }
    }
}

impl NoteFilter {
    /// Thresholds tuned for raw pitch-tracker output of strummed instruments
    ///
    /// Velocity >= 45 and duration >= 0.1s.
    pub fn transcription_cleanup() -> Self {
        Self {
            min_velocity: 45,
            min_duration: 0.1,
        }
    }

    /// True when the filter keeps every note
    pub fn is_pass_through(&self) -> bool {
        self.min_velocity == 0 && self.min_duration <= 0.0
    }

    /// Whether `note` survives the filter
    pub fn accepts(&self, note: &NoteEvent) -> bool {
        note.velocity() >= self.min_velocity && note.duration() >= self.min_duration
    }

    pub(crate) fn validate(&self) -> Result<(), AnalysisError> {
        if !self.min_duration.is_finite() || self.min_duration < 0.0 {
            return Err(AnalysisError::InvalidParameter(format!(
                "Note filter minimum duration must be >= 0, got {}",
                self.min_duration
            )));
        }
        Ok(())
    }
}

/// Apply `filter` to a sequence
///
/// # Returns
///
/// The surviving notes and the number of notes dropped
pub fn filter_notes(notes: &NoteSequence, filter: &NoteFilter) -> (NoteSequence, usize) {
    if filter.is_pass_through() {
        return (notes.clone(), 0);
    }

    let kept = notes.retain(|n| filter.accepts(n));
    let dropped = notes.len() - kept.len();

    if dropped > 0 {
        log::warn!(
            "Note filter dropped {} of {} notes (min_velocity={}, min_duration={:.2}s)",
            dropped,
            notes.len(),
            filter.min_velocity,
            filter.min_duration
        );
    }
    if kept.is_empty() && !notes.is_empty() {
        log::warn!("Note filter removed every note; analysis will see silence");
    }

    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn note(pitch: u8, start: f32, end: f32, velocity: u8) -> NoteEvent {
        NoteEvent::new(pitch, start, end, velocity).unwrap()
    }

    /// Records every log line so tests can check levels
    struct RecordingLogger {
        records: Mutex<Vec<(log::Level, String)>>,
    }

    impl log::Log for RecordingLogger {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            if let Ok(mut records) = self.records.lock() {
                records.push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: RecordingLogger = RecordingLogger {
        records: Mutex::new(Vec::new()),
    };

    fn recorded_warnings() -> Vec<String> {
        LOGGER
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|(level, _)| *level == log::Level::Warn)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    #[test]
    fn test_dropped_notes_logged_as_warning() {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Debug);

        let seq = NoteSequence::new(vec![note(60, 0.0, 1.0, 100), note(61, 0.5, 0.52, 10)]);
        let (kept, dropped) = filter_notes(&seq, &NoteFilter::transcription_cleanup());
        assert_eq!((kept.len(), dropped), (1, 1));

        let warnings = recorded_warnings();
        assert!(
            warnings.iter().any(|w| w.starts_with("Note filter dropped 1 of 2 notes")),
            "missing drop warning in {:?}",
            warnings
        );
    }

    #[test]
    fn test_default_keeps_everything() {
        let seq = NoteSequence::new(vec![note(60, 0.0, 0.01, 1), note(64, 0.0, 1.0, 100)]);
        let (kept, dropped) = filter_notes(&seq, &NoteFilter::default());
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped, 0);
    }

    #[test]
    fn test_transcription_cleanup() {
        let seq = NoteSequence::new(vec![
            note(60, 0.0, 1.0, 90),  // kept
            note(61, 0.0, 1.0, 20),  // too quiet
            note(62, 0.0, 0.05, 90), // too short
            note(67, 0.0, 0.1, 45),  // exactly at both thresholds
        ]);
        let (kept, dropped) = filter_notes(&seq, &NoteFilter::transcription_cleanup());
        let pitches: Vec<u8> = kept.iter().map(|n| n.pitch()).collect();
        assert_eq!(pitches, vec![60, 67]);
        assert_eq!(dropped, 2);
    }

    #[test]
    fn test_validate() {
        let filter = NoteFilter {
            min_velocity: 10,
            min_duration: -1.0,
        };
        assert!(filter.validate().is_err());
        assert!(NoteFilter::transcription_cleanup().validate().is_ok());
    }
}
