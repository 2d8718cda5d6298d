//! Note preprocessing
//!
//! Cleanup applied to transcribed notes before segmentation:
//! - Velocity / duration artifact filtering

pub mod note_filter;

pub use note_filter::{filter_notes, NoteFilter};
