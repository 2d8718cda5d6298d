//! Chord template matching
//!
//! Scores a pitch-class profile against every template in a library and picks
//! the best, or "no chord" when the profile is silent or the best match is
//! too weak.
//!
//! # Scoring
//!
//! The profile is normalized to sum to 1 (`w`). For a template with `k`
//! tones, each tone is credited up to the even share `1/k`:
//!
//! ```text
//! score = sum_{pc in T} min(w[pc], 1/k) - penalty * sum_{pc not in T} w[pc]
//! ```
//!
//! Capping the credit means one loud note cannot fill a whole chord, and the
//! penalty means templates that ignore loud foreign tones lose. A k-tone
//! template peaks at [`MAX_MATCH_SCORE`] when all weight is spread evenly
//! over its tones, for every k.

use super::templates::{ChordLibrary, ChordTemplate};
use crate::config::{DEFAULT_FOREIGN_TONE_PENALTY, DEFAULT_MIN_CHORD_CONFIDENCE};
use crate::error::AnalysisError;
use crate::features::chroma::{PitchClassProfile, PITCH_CLASSES};

/// Label used for windows without a chord
pub const NO_CHORD: &str = "N.C.";

/// Highest score any template can reach
pub const MAX_MATCH_SCORE: f32 = 1.0;

/// Scores this close are treated as tied
const SCORE_EPSILON: f32 = 1e-6;

/// Number of ranked hypotheses kept on a match
const TOP_N: usize = 3;

/// Outcome of matching one profile
#[derive(Debug, Clone, PartialEq)]
pub struct ChordMatch<'a> {
    /// Winning template, `None` for "no chord"
    pub template: Option<&'a ChordTemplate>,

    /// Raw score of the best template (0.0 for silence)
    pub score: f32,

    /// Confidence in [0, 1]; 0.0 for "no chord"
    pub confidence: f32,

    /// Best templates by score, highest first (empty for silence)
    pub ranked: Vec<(&'a ChordTemplate, f32)>,
}

impl<'a> ChordMatch<'a> {
    fn no_chord(score: f32, ranked: Vec<(&'a ChordTemplate, f32)>) -> Self {
        Self {
            template: None,
            score,
            confidence: 0.0,
            ranked,
        }
    }

    /// Chord name, or [`NO_CHORD`]
    pub fn name(&self) -> &str {
        self.template.map(|t| t.name()).unwrap_or(NO_CHORD)
    }

    /// True for the "no chord" result
    pub fn is_no_chord(&self) -> bool {
        self.template.is_none()
    }
}

/// Matches profiles against a borrowed chord library
#[derive(Debug, Clone, Copy)]
pub struct ChordMatcher<'a> {
    library: &'a ChordLibrary,
    min_confidence: f32,
    foreign_tone_penalty: f32,
}

impl<'a> ChordMatcher<'a> {
    /// Matcher with default threshold (0.4) and penalty (0.5)
    pub fn new(library: &'a ChordLibrary) -> Self {
        Self {
            library,
            min_confidence: DEFAULT_MIN_CHORD_CONFIDENCE,
            foreign_tone_penalty: DEFAULT_FOREIGN_TONE_PENALTY,
        }
    }

    /// Matcher with explicit threshold and penalty
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidParameter` if `min_confidence` is outside
    /// [0, 1] or `foreign_tone_penalty` is negative
    pub fn with_params(
        library: &'a ChordLibrary,
        min_confidence: f32,
        foreign_tone_penalty: f32,
    ) -> Result<Self, AnalysisError> {
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(AnalysisError::InvalidParameter(format!(
                "Minimum chord confidence must be in [0, 1], got {}",
                min_confidence
            )));
        }
        if !foreign_tone_penalty.is_finite() || foreign_tone_penalty < 0.0 {
            return Err(AnalysisError::InvalidParameter(format!(
                "Foreign tone penalty must be >= 0, got {}",
                foreign_tone_penalty
            )));
        }
        Ok(Self {
            library,
            min_confidence,
            foreign_tone_penalty,
        })
    }

    /// Library this matcher reads
    pub fn library(&self) -> &'a ChordLibrary {
        self.library
    }

    /// Score of one template against a unit-sum profile
    pub fn score_template(&self, template: &ChordTemplate, normalized: &[f32; PITCH_CLASSES]) -> f32 {
        let share = 1.0 / template.cardinality() as f32;
        let mut inside = 0.0f32;
        let mut outside = 0.0f32;
        // Walk relative to the root so a transposed profile against a
        // transposed template sums the same terms in the same order.
        for offset in 0..PITCH_CLASSES {
            let pc = (template.root() + offset) % PITCH_CLASSES;
            if template.contains(pc) {
                inside += normalized[pc].min(share);
            } else {
                outside += normalized[pc];
            }
        }
        inside - self.foreign_tone_penalty * outside
    }

    /// Best chord for `profile`
    ///
    /// Ranking: score (descending, ties within 1e-6), then fewer pitch
    /// classes, then chord-tone weights read from the root, then library order.
    pub fn match_profile(&self, profile: &PitchClassProfile) -> ChordMatch<'a> {
        let Some(normalized) = profile.normalized() else {
            return ChordMatch::no_chord(0.0, Vec::new());
        };

        let templates = self.library.templates();
        let scores: Vec<f32> = templates
            .iter()
            .map(|t| self.score_template(t, &normalized))
            .collect();

        let ranked = self.rank(&scores, &normalized);
        let Some(&(best, best_score)) = ranked.first() else {
            return ChordMatch::no_chord(0.0, Vec::new());
        };
        let confidence = (best_score / MAX_MATCH_SCORE).clamp(0.0, 1.0);

        if confidence < self.min_confidence || confidence <= 0.0 {
            log::debug!(
                "No chord: best {} confidence {:.3} below threshold {:.3}",
                best.name(),
                confidence,
                self.min_confidence
            );
            return ChordMatch::no_chord(best_score, ranked);
        }

        ChordMatch {
            template: Some(best),
            score: best_score,
            confidence,
            ranked,
        }
    }

    /// Top hypotheses, best first, each picked by `select_best` from what is left
    fn rank(&self, scores: &[f32], normalized: &[f32; PITCH_CLASSES]) -> Vec<(&'a ChordTemplate, f32)> {
        let templates = self.library.templates();
        let mut remaining: Vec<usize> = (0..templates.len()).collect();
        let mut ranked = Vec::with_capacity(TOP_N);
        while ranked.len() < TOP_N {
            let Some(pos) = select_best(templates, scores, normalized, &remaining) else {
                break;
            };
            let idx = remaining.remove(pos);
            ranked.push((&templates[idx], scores[idx]));
        }
        ranked
    }
}

/// Position in `candidates` (library indices, ascending) of the best template
///
/// Criteria, in order:
/// 1. Highest score (within `SCORE_EPSILON`)
/// 2. Fewest pitch classes
/// 3. Heaviest chord tones in degree order: root first, then each tone
///    upward from the root
/// 4. Library order
///
/// The first three read the profile relative to each template's root, so a
/// transposed profile picks the transposed template. Library order only
/// decides between templates with the same tones or profiles that repeat
/// under rotation.
fn select_best(
    templates: &[ChordTemplate],
    scores: &[f32],
    normalized: &[f32; PITCH_CLASSES],
    candidates: &[usize],
) -> Option<usize> {
    let top = candidates
        .iter()
        .map(|&i| scores[i])
        .fold(f32::NEG_INFINITY, f32::max);
    let mut tied: Vec<usize> = (0..candidates.len())
        .filter(|&p| scores[candidates[p]] >= top - SCORE_EPSILON)
        .collect();

    let fewest = tied
        .iter()
        .map(|&p| templates[candidates[p]].cardinality())
        .min()?;
    tied.retain(|&p| templates[candidates[p]].cardinality() == fewest);

    for degree in 0..fewest {
        if tied.len() < 2 {
            break;
        }
        let weight = |p: usize| degree_weight(&templates[candidates[p]], normalized, degree);
        let heaviest = tied
            .iter()
            .map(|&p| weight(p))
            .fold(f32::NEG_INFINITY, f32::max);
        tied.retain(|&p| weight(p) >= heaviest - SCORE_EPSILON);
    }

    tied.first().copied()
}

/// Profile weight on the `degree`-th tone of `template`, counting up from the root
fn degree_weight(template: &ChordTemplate, normalized: &[f32; PITCH_CLASSES], degree: usize) -> f32 {
    (0..PITCH_CLASSES)
        .map(|offset| (template.root() + offset) % PITCH_CLASSES)
        .filter(|&pc| template.contains(pc))
        .nth(degree)
        .map_or(0.0, |pc| normalized[pc])
}
