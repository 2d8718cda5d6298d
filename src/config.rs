//! Configuration parameters for chord and key analysis
//!
//! Values are supplied by the caller (CLI or reporting layer). The chord
//! confidence and flicker defaults are tuning knobs, not derived constants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::preprocessing::NoteFilter;

/// Default minimum chord-match confidence (below this a window is "no chord")
pub const DEFAULT_MIN_CHORD_CONFIDENCE: f32 = 0.4;

/// Default minimum chord-event duration in seconds for flicker suppression
pub const DEFAULT_MIN_CHORD_DURATION: f32 = 0.15;

/// Default penalty multiplier for weight on pitch classes outside a template
pub const DEFAULT_FOREIGN_TONE_PENALTY: f32 = 0.5;

/// Window size selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WindowSize {
    /// Fixed window length in seconds (must be > 0)
    Fixed(f32),
    /// Estimate the window length from note-onset statistics
    Auto,
}

impl Default for WindowSize {
    fn default() -> Self {
        WindowSize::Auto
    }
}

impl FromStr for WindowSize {
    type Err = AnalysisError;

    /// Parse `"auto"` (any case) or a positive number of seconds
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("auto") {
            return Ok(WindowSize::Auto);
        }

        let seconds: f32 = trimmed.parse().map_err(|_| {
            AnalysisError::InvalidParameter(format!(
                "Invalid window size '{}': use a number of seconds or 'auto'",
                s
            ))
        })?;
        let size = WindowSize::Fixed(seconds);
        size.validate()?;
        Ok(size)
    }
}

impl fmt::Display for WindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowSize::Fixed(seconds) => write!(f, "{}s", seconds),
            WindowSize::Auto => write!(f, "auto"),
        }
    }
}

impl WindowSize {
    fn validate(&self) -> Result<(), AnalysisError> {
        if let WindowSize::Fixed(seconds) = *self {
            if !seconds.is_finite() || seconds <= 0.0 {
                return Err(AnalysisError::InvalidParameter(format!(
                    "Window size must be > 0, got {}",
                    seconds
                )));
            }
        }
        Ok(())
    }
}

/// Parameters for automatic window-size estimation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoWindowConfig {
    /// Onsets closer than this (seconds) belong to the same chord strike (default: 0.3)
    pub onset_cluster_gap: f32,

    /// Fraction of the median strike gap used as window size (default: 0.8)
    pub gap_scale: f32,

    /// Smallest window the estimator may return, in seconds (default: 0.5)
    pub min_window: f32,

    /// Largest window the estimator may return, in seconds (default: 4.0)
    pub max_window: f32,

    /// Window size used when fewer than two strikes are found (default: 2.0)
    pub fallback_window: f32,
}

impl Default for AutoWindowConfig {
    fn default() -> Self {
        Self {
            onset_cluster_gap: 0.3,
            gap_scale: 0.8,
            min_window: 0.5,
            max_window: 4.0,
            fallback_window: 2.0,
        }
    }
}

impl AutoWindowConfig {
    fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.min_window > 0.0 && self.min_window <= self.max_window) {
            return Err(AnalysisError::InvalidParameter(format!(
                "Auto window bounds must satisfy 0 < min <= max, got [{}, {}]",
                self.min_window, self.max_window
            )));
        }
        if !self.onset_cluster_gap.is_finite() || self.onset_cluster_gap < 0.0 {
            return Err(AnalysisError::InvalidParameter(format!(
                "Onset cluster gap must be >= 0, got {}",
                self.onset_cluster_gap
            )));
        }
        if !(self.gap_scale > 0.0 && self.gap_scale.is_finite()) {
            return Err(AnalysisError::InvalidParameter(format!(
                "Gap scale must be > 0, got {}",
                self.gap_scale
            )));
        }
        if !(self.fallback_window > 0.0 && self.fallback_window.is_finite()) {
            return Err(AnalysisError::InvalidParameter(format!(
                "Fallback window must be > 0, got {}",
                self.fallback_window
            )));
        }
        Ok(())
    }
}

/// Analysis configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    // Segmentation
    /// Window size, fixed seconds or auto (default: Auto)
    pub window_size: WindowSize,

    /// Auto window estimation parameters
    pub auto_window: AutoWindowConfig,

    /// Piece duration override in seconds (default: None = latest note end)
    pub duration: Option<f32>,

    // Aggregation
    /// Scale each note's overlap by velocity/127 (default: false)
    pub velocity_weighting: bool,

    /// Note cleanup applied before analysis (default: keep everything)
    pub note_filter: NoteFilter,

    // Chord matching
    /// Minimum match confidence in [0, 1] (default: 0.4)
    pub min_chord_confidence: f32,

    /// Penalty multiplier for weight outside a chord template (default: 0.5)
    pub foreign_tone_penalty: f32,

    // Progression
    /// Chord events shorter than this (seconds) are absorbed by a neighbor (default: 0.15)
    pub min_chord_duration: f32,

    /// Match windows on the rayon thread pool (default: true)
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_size: WindowSize::Auto,
            auto_window: AutoWindowConfig::default(),
            duration: None,
            velocity_weighting: false,
            note_filter: NoteFilter::default(),
            min_chord_confidence: DEFAULT_MIN_CHORD_CONFIDENCE,
            foreign_tone_penalty: DEFAULT_FOREIGN_TONE_PENALTY,
            min_chord_duration: DEFAULT_MIN_CHORD_DURATION,
            parallel: true,
        }
    }
}

impl AnalysisConfig {
    /// Check every parameter before any computation runs
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.window_size.validate()?;
        self.auto_window.validate()?;

        if !(0.0..=1.0).contains(&self.min_chord_confidence) {
            return Err(AnalysisError::InvalidParameter(format!(
                "Minimum chord confidence must be in [0, 1], got {}",
                self.min_chord_confidence
            )));
        }

        if !self.min_chord_duration.is_finite() || self.min_chord_duration < 0.0 {
            return Err(AnalysisError::InvalidParameter(format!(
                "Minimum chord duration must be >= 0, got {}",
                self.min_chord_duration
            )));
        }

        if !self.foreign_tone_penalty.is_finite() || self.foreign_tone_penalty < 0.0 {
            return Err(AnalysisError::InvalidParameter(format!(
                "Foreign tone penalty must be >= 0, got {}",
                self.foreign_tone_penalty
            )));
        }

        if let Some(duration) = self.duration {
            if !duration.is_finite() || duration < 0.0 {
                return Err(AnalysisError::InvalidParameter(format!(
                    "Piece duration must be >= 0, got {}",
                    duration
                )));
            }
        }

        self.note_filter.validate()
    }
}
