//! Analysis result types

use std::fmt;

use serde::{Deserialize, Serialize};

use super::metadata::AnalysisMetadata;
use super::summary::AnalysisSummary;
use crate::features::chords::NO_CHORD;
use crate::features::chroma::{note_name, PITCH_CLASSES};

/// Key mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Major mode
    Major,
    /// Minor mode
    Minor,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Major => write!(f, "major"),
            Mode::Minor => write!(f, "minor"),
        }
    }
}

/// Musical key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Major key (0 = C, 1 = C#, ..., 11 = B)
    Major(u32),
    /// Minor key (0 = C, 1 = C#, ..., 11 = B)
    Minor(u32),
}

impl Key {
    /// Key from a tonic pitch class and mode
    pub fn from_parts(tonic: usize, mode: Mode) -> Self {
        let tonic = (tonic % PITCH_CLASSES) as u32;
        match mode {
            Mode::Major => Key::Major(tonic),
            Mode::Minor => Key::Minor(tonic),
        }
    }

    /// Tonic pitch class
    pub fn tonic(&self) -> usize {
        match self {
            Key::Major(i) | Key::Minor(i) => *i as usize % PITCH_CLASSES,
        }
    }

    /// Mode
    pub fn mode(&self) -> Mode {
        match self {
            Key::Major(_) => Mode::Major,
            Key::Minor(_) => Mode::Minor,
        }
    }

    /// Get key name in chord-symbol notation (e.g., "C", "Am", "F#", "D#m")
    ///
    /// # Example
    ///
    /// ```
    /// use stratum_chords::analysis::result::Key;
    ///
    /// assert_eq!(Key::Major(0).name(), "C");
    /// assert_eq!(Key::Major(6).name(), "F#");
    /// assert_eq!(Key::Minor(9).name(), "Am");
    /// assert_eq!(Key::Minor(1).name(), "C#m");
    /// ```
    pub fn name(&self) -> String {
        match self.mode() {
            Mode::Major => note_name(self.tonic()).to_string(),
            Mode::Minor => format!("{}m", note_name(self.tonic())),
        }
    }

    /// Same mode, tonic moved by `semitones`
    pub fn transposed(&self, semitones: i32) -> Self {
        let tonic = (self.tonic() as i32 + semitones).rem_euclid(PITCH_CLASSES as i32) as usize;
        Key::from_parts(tonic, self.mode())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", note_name(self.tonic()), self.mode())
    }
}

/// Overall key of a piece
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEstimate {
    /// Tonic pitch class (0 = C)
    pub tonic: usize,

    /// Major or minor
    pub mode: Mode,

    /// Confidence (0.0-1.0); near 0 means the key is ambiguous
    pub confidence: f32,

    /// Pearson correlation of the winning key profile
    pub correlation: f32,

    /// Top keys with correlations (highest first, empty for silence)
    pub ranked: Vec<(Key, f32)>,
}

impl KeyEstimate {
    /// Zero-confidence estimate used for silence (C major)
    pub fn unknown() -> Self {
        Self {
            tonic: 0,
            mode: Mode::Major,
            confidence: 0.0,
            correlation: 0.0,
            ranked: Vec::new(),
        }
    }

    /// Estimated key
    pub fn key(&self) -> Key {
        Key::from_parts(self.tonic, self.mode)
    }
}

/// A chord held over a span of time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordEvent {
    /// Chord name, or "N.C." for no chord
    pub chord_name: String,

    /// Start time in seconds
    pub start: f32,

    /// End time in seconds
    pub end: f32,

    /// Match confidence (0.0-1.0)
    pub confidence: f32,
}

impl ChordEvent {
    /// Create a chord event
    pub fn new(chord_name: impl Into<String>, start: f32, end: f32, confidence: f32) -> Self {
        Self {
            chord_name: chord_name.into(),
            start,
            end,
            confidence,
        }
    }

    /// Length in seconds
    pub fn duration(&self) -> f32 {
        self.end - self.start
    }

    /// True for the "no chord" sentinel
    pub fn is_no_chord(&self) -> bool {
        self.chord_name == NO_CHORD
    }
}

impl fmt::Display for ChordEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} - {}] → {} ({:.2})",
            format_timestamp(self.start),
            format_timestamp(self.end),
            self.chord_name,
            self.confidence
        )
    }
}

/// Format seconds as `MM:SS`
pub fn format_timestamp(seconds: f32) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Complete analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Chord timeline, contiguous and ordered by start time
    pub chords: Vec<ChordEvent>,

    /// Overall key
    pub key: KeyEstimate,

    /// Summary statistics
    pub summary: AnalysisSummary,

    /// Analysis metadata
    pub metadata: AnalysisMetadata,
}

impl fmt::Display for AnalysisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.chords {
            writeln!(f, "{}", event)?;
        }
        writeln!(
            f,
            "Key: {} (confidence {:.2})",
            self.key.key(),
            self.key.confidence
        )?;
        write!(
            f,
            "{} chord events over {:.1}s, average confidence {:.2}",
            self.summary.event_count, self.summary.total_duration, self.summary.average_confidence
        )
    }
}
