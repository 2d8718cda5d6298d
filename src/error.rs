//! Error types for the chord/key inference engine

use std::fmt;

/// Errors that can occur during note analysis
///
/// Silence and ambiguous chords are not errors: they resolve to the
/// "no chord" sentinel and a zero-confidence key instead.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Configuration value out of range (window size, thresholds, ...)
    InvalidParameter(String),

    /// Malformed note event
    InvalidInput(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}
