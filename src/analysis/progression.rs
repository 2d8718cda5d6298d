//! Chord progression building
//!
//! Turns per-window chord matches into a compact timeline:
//! 1. One event per window
//! 2. Run-length merge of adjacent windows with the same chord
//! 3. Flicker suppression: events shorter than a minimum duration are
//!    absorbed by a neighbor
//!
//! The output is contiguous, ordered by start time, and a pure function of
//! its input.

use super::result::ChordEvent;
use crate::error::AnalysisError;
use crate::features::chords::ChordMatch;
use crate::features::segmentation::Window;

/// Build the chord timeline from windows and their matches
///
/// # Arguments
///
/// * `windows` - Analysis windows in time order
/// * `matches` - Matcher result for each window (same length and order)
/// * `min_duration` - Events shorter than this many seconds are absorbed
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if the slices differ in length or
/// are empty, and `AnalysisError::InvalidParameter` for a negative `min_duration`
pub fn build_progression(
    windows: &[Window],
    matches: &[ChordMatch<'_>],
    min_duration: f32,
) -> Result<Vec<ChordEvent>, AnalysisError> {
    if !min_duration.is_finite() || min_duration < 0.0 {
        return Err(AnalysisError::InvalidParameter(format!(
            "Minimum chord duration must be >= 0, got {}",
            min_duration
        )));
    }

    let events = window_events(windows, matches)?;
    let window_count = events.len();
    let merged = merge_runs(events);
    let merged_count = merged.len();
    let timeline = suppress_flicker(merged, min_duration);

    log::debug!(
        "Progression: {} windows -> {} runs -> {} events (min duration {:.2}s)",
        window_count,
        merged_count,
        timeline.len(),
        min_duration
    );

    Ok(timeline)
}

/// One chord event per window
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if the slices differ in length or are empty
pub fn window_events(
    windows: &[Window],
    matches: &[ChordMatch<'_>],
) -> Result<Vec<ChordEvent>, AnalysisError> {
    if windows.len() != matches.len() {
        return Err(AnalysisError::InvalidInput(format!(
            "Got {} windows but {} chord matches",
            windows.len(),
            matches.len()
        )));
    }
    if windows.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "Progression needs at least one window".to_string(),
        ));
    }

    debug_assert!(
        windows.windows(2).all(|pair| pair[0].end == pair[1].start),
        "windows must be ordered and contiguous"
    );

    Ok(windows
        .iter()
        .zip(matches)
        .map(|(w, m)| ChordEvent::new(m.name(), w.start, w.end, m.confidence))
        .collect())
}

/// Merge adjacent events that carry the same chord name
///
/// The merged confidence is the duration-weighted mean of the parts.
pub fn merge_runs(events: Vec<ChordEvent>) -> Vec<ChordEvent> {
    let mut merged: Vec<ChordEvent> = Vec::with_capacity(events.len());
    for event in events {
        match merged.last_mut() {
            Some(current) if current.chord_name == event.chord_name => {
                current.confidence = weighted_confidence(current, &event);
                current.end = event.end;
            }
            _ => merged.push(event),
        }
    }
    merged
}

/// Absorb events shorter than `min_duration` into a neighbor
///
/// The shortest offending event goes first (earliest on ties). It joins the
/// neighbor with the higher confidence, the following one on ties; the
/// neighbor keeps its name and confidence. Runs are re-merged after each step.
/// A lone event is always kept.
pub fn suppress_flicker(mut events: Vec<ChordEvent>, min_duration: f32) -> Vec<ChordEvent> {
    while events.len() > 1 {
        let mut shortest: Option<usize> = None;
        for (i, event) in events.iter().enumerate() {
            if event.duration() >= min_duration {
                continue;
            }
            match shortest {
                Some(s) if events[s].duration() <= event.duration() => {}
                _ => shortest = Some(i),
            }
        }
        let Some(idx) = shortest else {
            break;
        };

        let into_previous = match (idx.checked_sub(1), events.get(idx + 1)) {
            (Some(prev), Some(next)) => events[prev].confidence > next.confidence,
            (Some(_), None) => true,
            _ => false,
        };

        let absorbed = events.remove(idx);
        log::debug!(
            "Absorbing {:.3}s '{}' at {:.2}s into {} neighbor",
            absorbed.duration(),
            absorbed.chord_name,
            absorbed.start,
            if into_previous { "previous" } else { "following" }
        );
        if into_previous {
            events[idx - 1].end = absorbed.end;
        } else {
            events[idx].start = absorbed.start;
        }

        events = merge_runs(events);
    }

    debug_assert!(
        events.windows(2).all(|pair| pair[0].end == pair[1].start),
        "chord events must stay contiguous"
    );

    events
}

fn weighted_confidence(a: &ChordEvent, b: &ChordEvent) -> f32 {
    let (da, db) = (a.duration().max(0.0), b.duration().max(0.0));
    let total = da + db;
    if total <= 0.0 {
        return (a.confidence + b.confidence) * 0.5;
    }
    (a.confidence * da + b.confidence * db) / total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::chords::{ChordLibrary, ChordMatcher, NO_CHORD};
    use crate::features::chroma::PitchClassProfile;

    fn ev(name: &str, start: f32, end: f32, confidence: f32) -> ChordEvent {
        ChordEvent::new(name, start, end, confidence)
    }

    fn names(events: &[ChordEvent]) -> Vec<&str> {
        events.iter().map(|e| e.chord_name.as_str()).collect()
    }

    fn triad(root: usize, third: usize) -> PitchClassProfile {
        let mut p = PitchClassProfile::zero();
        p.add(root, 1.0);
        p.add((root + third) % 12, 1.0);
        p.add((root + 7) % 12, 1.0);
        p
    }

    #[test]
    fn test_merge_runs() {
        let events = vec![
            ev("G", 0.0, 1.0, 0.8),
            ev("G", 1.0, 3.0, 0.5),
            ev("C", 3.0, 4.0, 0.9),
            ev("G", 4.0, 5.0, 0.7),
        ];
        let merged = merge_runs(events);
        assert_eq!(names(&merged), vec!["G", "C", "G"]);
        assert_eq!(merged[0].end, 3.0);
        assert!((merged[0].confidence - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_flicker_prefers_higher_confidence_neighbor() {
        let events = vec![ev("G", 0.0, 2.0, 0.9), ev("Em", 2.0, 2.1, 0.5), ev("C", 2.1, 4.0, 0.6)];
        let out = suppress_flicker(events, 0.15);
        assert_eq!(names(&out), vec!["G", "C"]);
        assert_eq!(out[0].end, 2.1);
        assert_eq!(out[1].start, 2.1);
        assert_eq!(out[0].confidence, 0.9);
    }

    #[test]
    fn test_flicker_tie_goes_to_following() {
        let events = vec![ev("G", 0.0, 2.0, 0.7), ev("Em", 2.0, 2.1, 0.5), ev("C", 2.1, 4.0, 0.7)];
        let out = suppress_flicker(events, 0.15);
        assert_eq!(names(&out), vec!["G", "C"]);
        assert_eq!(out[1].start, 2.0);
    }

    #[test]
    fn test_flicker_between_same_chord_merges_run() {
        let events = vec![ev("G", 0.0, 2.0, 0.8), ev("D", 2.0, 2.05, 0.9), ev("G", 2.05, 4.0, 0.8)];
        let out = suppress_flicker(events, 0.15);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].chord_name, "G");
        assert_eq!((out[0].start, out[0].end), (0.0, 4.0));
    }

    #[test]
    fn test_flicker_at_edges() {
        let events = vec![ev("Am", 0.0, 0.1, 0.9), ev("F", 0.1, 2.0, 0.5), ev("E", 2.0, 2.05, 0.9)];
        let out = suppress_flicker(events, 0.15);
        assert_eq!(names(&out), vec!["F"]);
        assert_eq!((out[0].start, out[0].end), (0.0, 2.05));
    }

    #[test]
    fn test_lone_short_event_kept() {
        let out = suppress_flicker(vec![ev("C", 0.0, 0.05, 0.8)], 0.15);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_zero_min_duration_keeps_everything() {
        let events = vec![ev("G", 0.0, 0.01, 0.9), ev("C", 0.01, 0.02, 0.9)];
        assert_eq!(suppress_flicker(events.clone(), 0.0), events);
    }

    #[test]
    fn test_build_progression() {
        let library = ChordLibrary::standard();
        let matcher = ChordMatcher::new(&library);
        let windows: Vec<Window> = (0..6).map(|i| Window::new(i as f32, (i + 1) as f32)).collect();
        let profiles = [triad(7, 4), triad(7, 4), PitchClassProfile::zero(), triad(0, 4), triad(9, 3), triad(9, 3)];
        let matches: Vec<_> = profiles.iter().map(|p| matcher.match_profile(p)).collect();

        let events = build_progression(&windows, &matches, 0.15).unwrap();
        assert_eq!(names(&events), vec!["G", NO_CHORD, "C", "Am"]);
        assert_eq!(events[3].start, 4.0);
        assert_eq!(events[3].end, 6.0);
        assert_eq!(events[1].confidence, 0.0);
    }

    #[test]
    fn test_build_progression_idempotent() {
        let library = ChordLibrary::standard();
        let matcher = ChordMatcher::new(&library);
        let windows: Vec<Window> = (0..8).map(|i| Window::new(i as f32 * 0.1, (i + 1) as f32 * 0.1)).collect();
        let profiles = [
            triad(7, 4),
            triad(7, 4),
            triad(2, 4),
            triad(7, 4),
            triad(0, 4),
            triad(0, 4),
            triad(4, 3),
            triad(0, 4),
        ];
        let matches: Vec<_> = profiles.iter().map(|p| matcher.match_profile(p)).collect();

        let first = build_progression(&windows, &matches, 0.15).unwrap();
        let second = build_progression(&windows, &matches, 0.15).unwrap();
        assert_eq!(first, second);

        // Re-running the merge stages on their own output changes nothing
        assert_eq!(suppress_flicker(merge_runs(first.clone()), 0.15), first);
    }

    #[test]
    fn test_build_progression_errors() {
        let library = ChordLibrary::standard();
        let matcher = ChordMatcher::new(&library);
        let windows = vec![Window::new(0.0, 1.0), Window::new(1.0, 2.0)];
        let matches = vec![matcher.match_profile(&PitchClassProfile::zero())];
        assert!(matches!(
            build_progression(&windows, &matches, 0.1),
            Err(AnalysisError::InvalidInput(_))
        ));
        assert!(build_progression(&[], &[], 0.1).is_err());
        assert!(matches!(
            build_progression(&windows[..1], &matches, -1.0),
            Err(AnalysisError::InvalidParameter(_))
        ));
    }
}
