//! Key estimation
//!
//! Correlates a piece-wide pitch-class profile against the 24 rotated
//! Krumhansl-Kessler profiles and picks the best tonic/mode pair.
//!
//! Confidence is the best correlation's margin over the runner-up, scaled by
//! the headroom the runner-up leaves below a perfect correlation:
//! `(r1 - r2) / (1 - r2)`. A near-tie gives a confidence near 0.
//!
//! # Reference
//!
//! Krumhansl, C. L., & Kessler, E. J. (1982). Tracing the Dynamic Changes in Perceived
//! Tonal Organization in a Spatial Representation of Musical Keys. *Psychological Review*,
//! 89(4), 334-368.

use super::templates::KeyTemplates;
use crate::analysis::result::{ChordEvent, Key, KeyEstimate};
use crate::features::chords::ChordLibrary;
use crate::features::chroma::{aggregate_piece, PitchClassProfile, PITCH_CLASSES};
use crate::notes::NoteSequence;

/// Number of ranked keys kept on an estimate
const TOP_N: usize = 3;

/// Estimate the key of a piece from its notes
///
/// Builds a duration-weighted profile over the whole piece and hands it to
/// [`estimate_key_from_profile`]. An empty piece gives C major with
/// confidence 0.
pub fn estimate_key(
    notes: &NoteSequence,
    templates: &KeyTemplates,
    velocity_weighting: bool,
) -> KeyEstimate {
    log::debug!("Estimating key from {} notes", notes.len());
    let profile = aggregate_piece(notes, velocity_weighting);
    estimate_key_from_profile(&profile, templates)
}

/// Estimate the key from a pitch-class profile
pub fn estimate_key_from_profile(profile: &PitchClassProfile, templates: &KeyTemplates) -> KeyEstimate {
    if profile.is_silent() {
        log::debug!("Silent profile, no key");
        return KeyEstimate::unknown();
    }

    let mut scores: Vec<(Key, f32)> = Vec::with_capacity(2 * PITCH_CLASSES);
    for tonic in 0..PITCH_CLASSES as u32 {
        for key in [Key::Major(tonic), Key::Minor(tonic)] {
            scores.push((key, templates.correlate(profile, key)));
        }
    }

    // Stable sort keeps enumeration order (tonic C first, major before minor) on exact ties
    scores.sort_by(|a, b| b.1.total_cmp(&a.1));

    let (best_key, best) = scores[0];
    let second = scores[1].1;
    let confidence = margin_confidence(best, second);

    log::debug!(
        "Detected key: {} (r={:.4}, runner-up {} r={:.4}, confidence {:.4})",
        best_key.name(),
        best,
        scores[1].0.name(),
        second,
        confidence
    );

    KeyEstimate {
        tonic: best_key.tonic(),
        mode: best_key.mode(),
        confidence,
        correlation: best,
        ranked: scores.into_iter().take(TOP_N).collect(),
    }
}

/// Estimate the key from a chord timeline
///
/// Every resolved chord adds its event duration to each of its template's
/// pitch classes; the resulting profile is correlated like a note profile.
/// Chords missing from `library` and "no chord" events are skipped.
pub fn estimate_key_from_chords(
    events: &[ChordEvent],
    library: &ChordLibrary,
    templates: &KeyTemplates,
) -> KeyEstimate {
    let mut profile = PitchClassProfile::zero();
    for event in events {
        if let Some(template) = library.get(&event.chord_name) {
            for pc in template.pitch_classes() {
                profile.add(pc, event.duration());
            }
        }
    }
    log::debug!("Estimating key from {} chord events", events.len());
    estimate_key_from_profile(&profile, templates)
}

fn margin_confidence(best: f32, second: f32) -> f32 {
    if best <= 0.0 {
        return 0.0;
    }
    let headroom = 1.0 - second;
    if headroom <= 1e-9 {
        return 0.0;
    }
    ((best - second) / headroom).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::result::Mode;
    use crate::notes::NoteEvent;

    fn chord(pitches: &[u8], start: f32, end: f32) -> Vec<NoteEvent> {
        pitches
            .iter()
            .map(|&p| NoteEvent::new(p, start, end, 100).unwrap())
            .collect()
    }

    fn g_c_d_g() -> NoteSequence {
        let mut notes = Vec::new();
        notes.extend(chord(&[55, 59, 62, 67], 0.0, 2.0));
        notes.extend(chord(&[60, 64, 67, 72], 2.0, 4.0));
        notes.extend(chord(&[62, 66, 69, 74], 4.0, 6.0));
        notes.extend(chord(&[55, 59, 62, 67], 6.0, 8.0));
        NoteSequence::new(notes)
    }

    #[test]
    fn test_empty_is_zero_confidence() {
        let estimate = estimate_key(&NoteSequence::default(), &KeyTemplates::new(), false);
        assert_eq!(estimate.confidence, 0.0);
        assert_eq!(estimate.tonic, 0);
        assert_eq!(estimate.mode, Mode::Major);
        assert!(estimate.ranked.is_empty());
    }

    #[test]
    fn test_g_major_progression() {
        let estimate = estimate_key(&g_c_d_g(), &KeyTemplates::new(), false);
        assert_eq!(estimate.key(), Key::Major(7));
        assert!(estimate.confidence > 0.5, "confidence {}", estimate.confidence);
        assert_eq!(estimate.ranked.len(), 3);
        assert_eq!(estimate.ranked[0].0, Key::Major(7));
    }

    #[test]
    fn test_a_minor() {
        // i - iv - V - i in A minor (Am, Dm, E, Am)
        let mut notes = Vec::new();
        notes.extend(chord(&[57, 60, 64, 69], 0.0, 2.0));
        notes.extend(chord(&[62, 65, 69, 74], 2.0, 4.0));
        notes.extend(chord(&[56, 59, 64, 68], 4.0, 6.0));
        notes.extend(chord(&[57, 60, 64, 69], 6.0, 10.0));
        let estimate = estimate_key(&NoteSequence::new(notes), &KeyTemplates::new(), false);
        assert_eq!(estimate.key(), Key::Minor(9));
    }

    #[test]
    fn test_transposition_invariance() {
        let templates = KeyTemplates::new();
        let base = g_c_d_g();
        let reference = estimate_key(&base, &templates, false);

        for n in -7..=5 {
            let moved = estimate_key(&base.transposed(n).unwrap(), &templates, false);
            assert_eq!(moved.tonic, (reference.tonic as i32 + n).rem_euclid(12) as usize);
            assert_eq!(moved.mode, reference.mode);
            assert!((moved.confidence - reference.confidence).abs() < 1e-6);
        }
    }

    #[test]
    fn test_flat_profile_has_no_confidence() {
        let flat = PitchClassProfile::from_weights([1.0; 12]).unwrap();
        let estimate = estimate_key_from_profile(&flat, &KeyTemplates::new());
        assert_eq!(estimate.confidence, 0.0);
    }

    #[test]
    fn test_key_from_chords() {
        let library = ChordLibrary::standard();
        let events = vec![
            ChordEvent::new("G", 0.0, 2.0, 0.9),
            ChordEvent::new("C", 2.0, 4.0, 0.9),
            ChordEvent::new("D", 4.0, 6.0, 0.9),
            ChordEvent::new("N.C.", 6.0, 7.0, 0.0),
            ChordEvent::new("G", 7.0, 9.0, 0.9),
        ];
        let estimate = estimate_key_from_chords(&events, &library, &KeyTemplates::new());
        assert_eq!(estimate.key(), Key::Major(7));

        let silent = estimate_key_from_chords(&[], &library, &KeyTemplates::new());
        assert_eq!(silent.confidence, 0.0);
    }

    #[test]
    fn test_margin_confidence() {
        assert_eq!(margin_confidence(-0.2, -0.3), 0.0);
        assert_eq!(margin_confidence(0.9, 0.9), 0.0);
        assert!((margin_confidence(0.9, 0.5) - 0.8).abs() < 1e-6);
        assert_eq!(margin_confidence(1.0, 1.0), 0.0);
    }
}
