//! # Stratum Chords
//!
//! A symbolic harmony analysis engine: infers a time-stamped chord
//! progression and the overall key of a piece from transcribed note events.
//!
//! ## Features
//!
//! - **Segmentation**: Fixed-length windows, or a window size estimated from onset spacing
//! - **Chord Recognition**: Duration-weighted pitch-class profiles matched against
//!   84 chord templates (7 qualities x 12 roots)
//! - **Progression Building**: Run-length merging and flicker suppression
//! - **Key Detection**: Krumhansl-Kessler template correlation with margin-based confidence
//!
//! ## Quick Start
//!
//! ```
//! use stratum_chords::{analyze_notes, AnalysisConfig, NoteEvent, NoteSequence, WindowSize};
//!
//! // C major triad held for two seconds
//! let notes: NoteSequence = [60u8, 64, 67]
//!     .iter()
//!     .map(|&p| NoteEvent::new(p, 0.0, 2.0, 90))
//!     .collect::<Result<Vec<_>, _>>()?
//!     .into();
//!
//! let config = AnalysisConfig {
//!     window_size: WindowSize::Fixed(1.0),
//!     ..Default::default()
//! };
//! let result = analyze_notes(&notes, config)?;
//!
//! assert_eq!(result.chords[0].chord_name, "C");
//! println!("Key: {} (confidence: {:.2})", result.key.key(), result.key.confidence);
//! # Ok::<(), stratum_chords::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! The analysis pipeline follows this flow:
//!
//! ```text
//! Notes → Filtering → Segmentation → Aggregation → Chord Matching → Progression
//!                                  ↘ Piece Profile → Key Estimation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod notes;
pub mod preprocessing;

use rayon::prelude::*;

// Re-export main types
pub use analysis::result::{AnalysisResult, ChordEvent, Key, KeyEstimate, Mode};
pub use analysis::{AnalysisFlag, AnalysisMetadata, AnalysisSummary};
pub use config::{AnalysisConfig, WindowSize};
pub use error::AnalysisError;
pub use notes::{NoteEvent, NoteSequence};

use analysis::metadata::collect_flags;
use features::chords::{ChordLibrary, ChordMatch, ChordMatcher, NO_CHORD};
use features::chroma::ChromaAggregator;
use features::key::{estimate_key_from_profile, KeyTemplates};
use features::segmentation::{segment, Window};

/// Main analysis function
///
/// Infers the chord progression and overall key of a piece.
///
/// # Arguments
///
/// * `notes` - Transcribed note events of one piece
/// * `config` - Analysis configuration parameters
///
/// # Returns
///
/// `AnalysisResult` with a contiguous chord timeline covering `[0, D]`, the
/// key estimate, summary statistics, and metadata. `D` is `config.duration`
/// when set, otherwise the latest note end.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidParameter` if any configuration value is out
/// of range. Validation runs before any computation.
///
/// # Example
///
/// ```
/// use stratum_chords::{analyze_notes, AnalysisConfig, NoteSequence};
///
/// let config = AnalysisConfig {
///     duration: Some(4.0),
///     ..Default::default()
/// };
/// let result = analyze_notes(&NoteSequence::default(), config)?;
/// assert_eq!(result.chords.len(), 1);
/// assert!(result.chords[0].is_no_chord());
/// assert_eq!(result.key.confidence, 0.0);
/// # Ok::<(), stratum_chords::AnalysisError>(())
/// ```
pub fn analyze_notes(
    notes: &NoteSequence,
    config: AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    use std::time::Instant;
    let start_time = Instant::now();

    config.validate()?;

    log::debug!(
        "Starting chord analysis: {} notes, window size {}",
        notes.len(),
        config.window_size
    );

    // Preprocessing
    let (notes_to_analyze, filtered_note_count) =
        preprocessing::filter_notes(notes, &config.note_filter);
    let duration = config.duration.unwrap_or_else(|| notes.end_time());

    if notes_to_analyze.is_empty() {
        log::debug!("No notes to analyze, returning a single no-chord span over {:.2}s", duration);
        return Ok(silent_result(
            duration,
            notes.len(),
            filtered_note_count,
            &config,
            start_time,
        ));
    }

    // Segmentation
    let (windows, auto_window) = segment(
        &notes_to_analyze,
        duration,
        config.window_size,
        &config.auto_window,
    )?;
    let window_size = match (&auto_window, config.window_size) {
        (Some(estimate), _) => estimate.window_size,
        (None, WindowSize::Fixed(size)) => size,
        (None, WindowSize::Auto) => duration,
    };
    if let Some(estimate) = &auto_window {
        log::debug!(
            "Auto window: {:.3}s from {} strikes (median gap {:?})",
            estimate.window_size,
            estimate.strike_count,
            estimate.median_gap
        );
    }

    // Aggregation + chord matching
    let aggregator = ChromaAggregator::new(&notes_to_analyze, config.velocity_weighting);
    let matcher = ChordMatcher::with_params(
        ChordLibrary::shared(),
        config.min_chord_confidence,
        config.foreign_tone_penalty,
    )?;
    let match_window = |window: &Window| -> ChordMatch<'static> {
        matcher.match_profile(&aggregator.aggregate(window))
    };
    let matches: Vec<ChordMatch<'static>> = if config.parallel {
        windows.par_iter().map(match_window).collect()
    } else {
        windows.iter().map(match_window).collect()
    };

    log::debug!(
        "Matched {} windows ({} without a chord)",
        matches.len(),
        matches.iter().filter(|m| m.is_no_chord()).count()
    );

    // Progression
    let chords = analysis::build_progression(&windows, &matches, config.min_chord_duration)?;

    // Key over the analyzed span
    let piece_profile = aggregator.aggregate(&Window::new(0.0, duration));
    let key = estimate_key_from_profile(&piece_profile, &KeyTemplates::new());

    let summary = analysis::summarize(&chords);
    let (flags, confidence_warnings) = collect_flags(
        notes_to_analyze.len(),
        &chords,
        &key,
        &summary,
        config.min_chord_confidence,
    );

    let processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;

    log::debug!(
        "Chord analysis complete: {} events, key {} ({:.2}) in {:.1} ms",
        chords.len(),
        key.key(),
        key.confidence,
        processing_time_ms
    );

    Ok(AnalysisResult {
        chords,
        key,
        summary,
        metadata: AnalysisMetadata {
            duration_seconds: duration,
            processing_time_ms,
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
            window_size,
            window_count: windows.len(),
            auto_window,
            input_note_count: notes.len(),
            filtered_note_count,
            flags,
            confidence_warnings,
        },
    })
}

fn silent_result(
    duration: f32,
    input_note_count: usize,
    filtered_note_count: usize,
    config: &AnalysisConfig,
    start_time: std::time::Instant,
) -> AnalysisResult {
    let chords = vec![ChordEvent::new(NO_CHORD, 0.0, duration, 0.0)];
    let key = KeyEstimate::unknown();
    let summary = analysis::summarize(&chords);
    let (flags, confidence_warnings) =
        collect_flags(0, &chords, &key, &summary, config.min_chord_confidence);
    let window_size = match config.window_size {
        WindowSize::Fixed(size) => size,
        WindowSize::Auto => duration,
    };

    AnalysisResult {
        chords,
        key,
        summary,
        metadata: AnalysisMetadata {
            duration_seconds: duration,
            processing_time_ms: start_time.elapsed().as_secs_f32() * 1000.0,
            window_size,
            window_count: 1,
            input_note_count,
            filtered_note_count,
            flags,
            confidence_warnings,
            ..Default::default()
        },
    }
}
