//! Chord recognition
//!
//! Match window pitch-class profiles against a chord template library:
//! - Template library (7 qualities x 12 roots)
//! - Scored matching with deterministic tie-breaks

pub mod matcher;
pub mod templates;

pub use matcher::{ChordMatch, ChordMatcher, MAX_MATCH_SCORE, NO_CHORD};
pub use templates::{ChordLibrary, ChordQuality, ChordTemplate};
