//! Krumhansl-Kessler key templates
//!
//! Tonal profiles for 24 keys (12 major + 12 minor), stored once for tonic C
//! and rotated on demand.

use crate::analysis::result::{Key, Mode};
use crate::features::chroma::{PitchClassProfile, PITCH_CLASSES};

/// Krumhansl-Kessler probe-tone ratings for C major
const KK_MAJOR: [f32; PITCH_CLASSES] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// Krumhansl-Kessler probe-tone ratings for C minor
const KK_MINOR: [f32; PITCH_CLASSES] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Key templates for all 24 keys
#[derive(Debug, Clone, PartialEq)]
pub struct KeyTemplates {
    /// Major profile with tonic C
    pub major: [f32; PITCH_CLASSES],

    /// Minor profile with tonic C
    pub minor: [f32; PITCH_CLASSES],
}

impl KeyTemplates {
    /// Create key templates with Krumhansl-Kessler profiles
    pub fn new() -> Self {
        Self {
            major: KK_MAJOR,
            minor: KK_MINOR,
        }
    }

    /// Profile for `mode` with tonic C
    pub fn base(&self, mode: Mode) -> &[f32; PITCH_CLASSES] {
        match mode {
            Mode::Major => &self.major,
            Mode::Minor => &self.minor,
        }
    }

    /// Major template rotated to `tonic` (0 = C, 1 = C#, ..., 11 = B)
    pub fn get_major_template(&self, tonic: usize) -> [f32; PITCH_CLASSES] {
        rotate(&self.major, tonic)
    }

    /// Minor template rotated to `tonic`
    pub fn get_minor_template(&self, tonic: usize) -> [f32; PITCH_CLASSES] {
        rotate(&self.minor, tonic)
    }

    /// Pearson correlation between `profile` and the template for `key`
    ///
    /// The profile is rotated down to tonic C rather than the template up, so
    /// a transposed profile against the transposed key evaluates the exact
    /// same sums. A flat or silent profile correlates 0.
    pub fn correlate(&self, profile: &PitchClassProfile, key: Key) -> f32 {
        let weights = profile.weights();
        let tonic = key.tonic();
        let mut relative = [0.0f32; PITCH_CLASSES];
        for (i, r) in relative.iter_mut().enumerate() {
            *r = weights[(i + tonic) % PITCH_CLASSES];
        }
        pearson(&relative, self.base(key.mode()))
    }
}

impl Default for KeyTemplates {
    fn default() -> Self {
        Self::new()
    }
}

/// Template value for pitch class `pc` lands at `(pc + tonic) % 12`
fn rotate(base: &[f32; PITCH_CLASSES], tonic: usize) -> [f32; PITCH_CLASSES] {
    let mut out = [0.0f32; PITCH_CLASSES];
    for (pc, &v) in base.iter().enumerate() {
        out[(pc + tonic) % PITCH_CLASSES] = v;
    }
    out
}

/// Pearson correlation coefficient of two 12-element arrays
fn pearson(x: &[f32; PITCH_CLASSES], y: &[f32; PITCH_CLASSES]) -> f32 {
    let n = PITCH_CLASSES as f32;
    let x_mean = x.iter().sum::<f32>() / n;
    let y_mean = y.iter().sum::<f32>() / n;

    let mut num = 0.0f32;
    let mut x_sq = 0.0f32;
    let mut y_sq = 0.0f32;
    for i in 0..PITCH_CLASSES {
        let xd = x[i] - x_mean;
        let yd = y[i] - y_mean;
        num += xd * yd;
        x_sq += xd * xd;
        y_sq += yd * yd;
    }

    let denom = (x_sq * y_sq).sqrt();
    if denom < 1e-9 {
        return 0.0;
    }
    num / denom
}
