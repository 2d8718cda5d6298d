//! Key estimation modules
//!
//! Estimate the overall key of a piece using:
//! - Krumhansl-Kessler templates (24 keys)
//! - Pearson correlation with margin-based confidence

pub mod detector;
pub mod templates;

pub use detector::{estimate_key, estimate_key_from_chords, estimate_key_from_profile};
pub use templates::KeyTemplates;
