//! Analysis metadata structures

use serde::{Deserialize, Serialize};

use super::result::{ChordEvent, KeyEstimate};
use super::summary::AnalysisSummary;
use crate::features::segmentation::AutoWindowEstimate;

/// Key confidence below which the piece is flagged as weakly tonal
pub const WEAK_TONALITY_THRESHOLD: f32 = 0.2;

/// Analysis flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalysisFlag {
    /// No notes left to analyze
    Silence,
    /// Low key confidence (atonal/ambiguous)
    WeakTonality,
    /// Average chord confidence below the matching threshold
    LowChordConfidence,
}

/// Analysis metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Piece duration in seconds
    pub duration_seconds: f32,

    /// Processing time in milliseconds
    pub processing_time_ms: f32,

    /// Algorithm version
    pub algorithm_version: String,

    /// Window size actually used, in seconds
    pub window_size: f32,

    /// Number of analysis windows
    pub window_count: usize,

    /// Auto window estimate (only when the window size was auto)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_window: Option<AutoWindowEstimate>,

    /// Notes supplied by the caller
    pub input_note_count: usize,

    /// Notes removed by the note filter
    pub filtered_note_count: usize,

    /// Analysis flags
    pub flags: Vec<AnalysisFlag>,

    /// Confidence warnings (low confidence, ambiguous results, etc.)
    pub confidence_warnings: Vec<String>,
}

impl Default for AnalysisMetadata {
    fn default() -> Self {
        Self {
            duration_seconds: 0.0,
            processing_time_ms: 0.0,
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
            window_size: 0.0,
            window_count: 0,
            auto_window: None,
            input_note_count: 0,
            filtered_note_count: 0,
            flags: vec![],
            confidence_warnings: vec![],
        }
    }
}

/// Derive flags and warnings from a finished analysis
pub fn collect_flags(
    analyzed_notes: usize,
    chords: &[ChordEvent],
    key: &KeyEstimate,
    summary: &AnalysisSummary,
    min_chord_confidence: f32,
) -> (Vec<AnalysisFlag>, Vec<String>) {
    let mut flags = Vec::new();
    let mut warnings = Vec::new();

    if analyzed_notes == 0 {
        flags.push(AnalysisFlag::Silence);
        warnings.push("No notes to analyze; timeline is a single no-chord span".to_string());
        return (flags, warnings);
    }

    if key.confidence < WEAK_TONALITY_THRESHOLD {
        flags.push(AnalysisFlag::WeakTonality);
        warnings.push(format!(
            "Key {} is ambiguous (confidence {:.2})",
            key.key(),
            key.confidence
        ));
    }

    let any_chord = chords.iter().any(|e| !e.is_no_chord());
    if any_chord && summary.average_confidence < min_chord_confidence {
        flags.push(AnalysisFlag::LowChordConfidence);
        warnings.push(format!(
            "Average chord confidence {:.2} is below {:.2}",
            summary.average_confidence, min_chord_confidence
        ));
    }

    (flags, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::result::Mode;
    use crate::analysis::summary::summarize;
    use crate::features::chords::NO_CHORD;

    fn key(confidence: f32) -> KeyEstimate {
        KeyEstimate {
            tonic: 7,
            mode: Mode::Major,
            confidence,
            correlation: 0.8,
            ranked: vec![],
        }
    }

    #[test]
    fn test_silence_flag() {
        let chords = vec![ChordEvent::new(NO_CHORD, 0.0, 4.0, 0.0)];
        let (flags, warnings) = collect_flags(0, &chords, &KeyEstimate::unknown(), &summarize(&chords), 0.4);
        assert_eq!(flags, vec![AnalysisFlag::Silence]);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_confident_analysis_has_no_flags() {
        let chords = vec![ChordEvent::new("G", 0.0, 2.0, 0.9), ChordEvent::new("C", 2.0, 4.0, 0.8)];
        let (flags, _) = collect_flags(8, &chords, &key(0.9), &summarize(&chords), 0.4);
        assert!(flags.is_empty());
    }

    #[test]
    fn test_weak_and_low_confidence_flags() {
        let chords = vec![ChordEvent::new("G", 0.0, 1.0, 0.45), ChordEvent::new(NO_CHORD, 1.0, 4.0, 0.0)];
        let (flags, warnings) = collect_flags(5, &chords, &key(0.1), &summarize(&chords), 0.4);
        assert_eq!(flags, vec![AnalysisFlag::WeakTonality, AnalysisFlag::LowChordConfidence]);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_default_version() {
        assert_eq!(AnalysisMetadata::default().algorithm_version, env!("CARGO_PKG_VERSION"));
    }
}
