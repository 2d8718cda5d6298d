//! Window segmentation
//!
//! Split a piece's timeline into contiguous, non-overlapping analysis windows:
//! - Fixed-length windows
//! - Auto window length from onset statistics

pub mod auto;
pub mod window;

pub use auto::{estimate_window_size, AutoWindowEstimate};
pub use window::{segment_fixed, Window};

use crate::config::{AutoWindowConfig, WindowSize};
use crate::error::AnalysisError;
use crate::notes::NoteSequence;

/// Segment `[0, duration]` according to `window_size`
///
/// # Returns
///
/// The windows in time order, plus the auto estimate when `WindowSize::Auto`
/// was requested
///
/// # Errors
///
/// Returns `AnalysisError::InvalidParameter` for a fixed size <= 0 or a
/// negative duration
pub fn segment(
    notes: &NoteSequence,
    duration: f32,
    window_size: WindowSize,
    auto_config: &AutoWindowConfig,
) -> Result<(Vec<Window>, Option<AutoWindowEstimate>), AnalysisError> {
    match window_size {
        WindowSize::Fixed(size) => Ok((segment_fixed(duration, size)?, None)),
        WindowSize::Auto => {
            let estimate = estimate_window_size(&notes.onsets(), auto_config);
            let windows = segment_fixed(duration, estimate.window_size)?;
            Ok((windows, Some(estimate)))
        }
    }
}
