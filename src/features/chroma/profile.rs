//! 12-bin pitch-class profile

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Number of pitch classes
pub const PITCH_CLASSES: usize = 12;

/// Sharp-spelled pitch-class names (0 = C)
pub const NOTE_NAMES: [&str; PITCH_CLASSES] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Name of a pitch class (wraps modulo 12)
pub fn note_name(pitch_class: usize) -> &'static str {
    NOTE_NAMES[pitch_class % PITCH_CLASSES]
}

/// How much each pitch class sounds over some span
///
/// Always 12 non-negative weights. An all-zero profile is valid and means
/// silence.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PitchClassProfile {
    weights: [f32; PITCH_CLASSES],
}

impl PitchClassProfile {
    /// Silent profile
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build a profile from explicit weights
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if any weight is negative or not finite
    pub fn from_weights(weights: [f32; PITCH_CLASSES]) -> Result<Self, AnalysisError> {
        if let Some((pc, w)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(AnalysisError::InvalidInput(format!(
                "Profile weight for pitch class {} must be finite and >= 0, got {}",
                pc, w
            )));
        }
        Ok(Self { weights })
    }

    /// Add `weight` to pitch class `pitch_class`; negative or non-finite weights are ignored
    pub fn add(&mut self, pitch_class: usize, weight: f32) {
        if weight.is_finite() && weight > 0.0 {
            self.weights[pitch_class % PITCH_CLASSES] += weight;
        }
    }

    /// Weight of one pitch class
    pub fn weight(&self, pitch_class: usize) -> f32 {
        self.weights[pitch_class % PITCH_CLASSES]
    }

    /// All 12 weights (index 0 = C)
    pub fn weights(&self) -> &[f32; PITCH_CLASSES] {
        &self.weights
    }

    /// Sum of all weights
    pub fn total(&self) -> f32 {
        self.weights.iter().sum()
    }

    /// True when nothing sounds
    pub fn is_silent(&self) -> bool {
        self.weights.iter().all(|&w| w <= 0.0)
    }

    /// Weights scaled to sum to 1, or `None` for a silent profile
    pub fn normalized(&self) -> Option<[f32; PITCH_CLASSES]> {
        let total = self.total();
        if total <= 0.0 {
            return None;
        }
        let mut out = self.weights;
        for w in out.iter_mut() {
            *w /= total;
        }
        Some(out)
    }

    /// Profile moved up by `semitones` (weight of C lands on C + semitones)
    pub fn transposed(&self, semitones: i32) -> Self {
        let shift = semitones.rem_euclid(PITCH_CLASSES as i32) as usize;
        let mut weights = [0.0; PITCH_CLASSES];
        for (pc, &w) in self.weights.iter().enumerate() {
            weights[(pc + shift) % PITCH_CLASSES] = w;
        }
        Self { weights }
    }

    /// Pitch classes with non-zero weight, ascending
    pub fn active_pitch_classes(&self) -> Vec<usize> {
        (0..PITCH_CLASSES).filter(|&pc| self.weights[pc] > 0.0).collect()
    }
}

impl std::ops::AddAssign<&PitchClassProfile> for PitchClassProfile {
    fn add_assign(&mut self, rhs: &PitchClassProfile) {
        for (a, b) in self.weights.iter_mut().zip(rhs.weights.iter()) {
            *a += *b;
        }
    }
}

// Deserialization goes through `from_weights` so serialized weights are validated too.
impl<'de> Deserialize<'de> for PitchClassProfile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawProfile {
            weights: [f32; PITCH_CLASSES],
        }

        let raw = RawProfile::deserialize(deserializer)?;
        PitchClassProfile::from_weights(raw.weights).map_err(serde::de::Error::custom)
    }
}
