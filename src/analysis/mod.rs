//! Analysis and result aggregation modules
//!
//! Combines per-window chord matches and the piece-wide key into final results:
//! - Chord progression building
//! - Result types
//! - Summary statistics
//! - Metadata

pub mod metadata;
pub mod progression;
pub mod result;
pub mod summary;

pub use metadata::{AnalysisFlag, AnalysisMetadata};
pub use progression::build_progression;
pub use result::{AnalysisResult, ChordEvent, Key, KeyEstimate, Mode};
pub use summary::{summarize, AnalysisSummary};
