//! Pitch-class aggregation
//!
//! Turn the notes sounding in a window into a 12-bin pitch-class profile:
//! - Profile type and normalization
//! - Duration-weighted window aggregation

pub mod aggregator;
pub mod profile;

pub use aggregator::{aggregate_piece, aggregate_window, ChromaAggregator};
pub use profile::{note_name, PitchClassProfile, NOTE_NAMES, PITCH_CLASSES};
