//! Note event store
//!
//! Immutable note events produced by an upstream transcription step, and the
//! ordered per-piece collection every analysis stage reads from.

pub mod event;
pub mod store;

pub use event::{pitch_class, NoteEvent};
pub use store::NoteSequence;
