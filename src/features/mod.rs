//! Feature extraction modules
//!
//! This module contains the symbolic analysis stages:
//! - Window segmentation (fixed + auto)
//! - Pitch-class aggregation
//! - Chord template matching
//! - Key detection

pub mod chords;
pub mod chroma;
pub mod key;
pub mod segmentation;
