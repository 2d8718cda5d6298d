//! Analysis windows and fixed-length segmentation

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Windows shorter than this at the end of a piece are folded into the previous one
const MIN_TAIL_WINDOW: f32 = 1e-4;

/// Contiguous span of the timeline, `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    /// Start time in seconds
    pub start: f32,
    /// End time in seconds
    pub end: f32,
}

impl Window {
    /// Create a window
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Window length in seconds
    pub fn duration(&self) -> f32 {
        self.end - self.start
    }
}

/// Split `[0, duration]` into windows of `window_size` seconds
///
/// The final window is clipped to the piece end. A zero-length piece yields
/// the single window `[0, 0]`.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidParameter` if `window_size <= 0` or
/// `duration < 0` (or either is not finite)
pub fn segment_fixed(duration: f32, window_size: f32) -> Result<Vec<Window>, AnalysisError> {
    if !window_size.is_finite() || window_size <= 0.0 {
        return Err(AnalysisError::InvalidParameter(format!(
            "Window size must be > 0, got {}",
            window_size
        )));
    }
    if !duration.is_finite() || duration < 0.0 {
        return Err(AnalysisError::InvalidParameter(format!(
            "Piece duration must be >= 0, got {}",
            duration
        )));
    }

    if duration == 0.0 {
        return Ok(vec![Window::new(0.0, 0.0)]);
    }

    // Start times are computed as i * size rather than accumulated, so
    // long pieces do not drift.
    let mut windows = Vec::with_capacity((duration / window_size).ceil() as usize + 1);
    let mut i = 0usize;
    loop {
        let start = i as f32 * window_size;
        if start >= duration {
            break;
        }
        let end = ((i + 1) as f32 * window_size).min(duration);
        windows.push(Window::new(start, end));
        i += 1;
    }

    if windows.len() > 1 {
        let tail = windows[windows.len() - 1];
        if tail.duration() < MIN_TAIL_WINDOW {
            windows.pop();
            if let Some(last) = windows.last_mut() {
                last.end = duration;
            }
        }
    }

    debug_assert!(is_contiguous(&windows, duration));

    log::debug!(
        "Segmented {:.2}s into {} windows of {:.3}s",
        duration,
        windows.len(),
        window_size
    );

    Ok(windows)
}

/// True when windows start at 0, end at `duration`, and each starts where the previous ended
pub(crate) fn is_contiguous(windows: &[Window], duration: f32) -> bool {
    let (Some(first), Some(last)) = (windows.first(), windows.last()) else {
        return false;
    };
    first.start == 0.0
        && last.end == duration
        && windows.iter().all(|w| w.end >= w.start)
        && windows.windows(2).all(|pair| pair[0].end == pair[1].start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_division() {
        let windows = segment_fixed(8.0, 2.0).unwrap();
        assert_eq!(
            windows,
            vec![
                Window::new(0.0, 2.0),
                Window::new(2.0, 4.0),
                Window::new(4.0, 6.0),
                Window::new(6.0, 8.0),
            ]
        );
    }

    #[test]
    fn test_last_window_clipped() {
        let windows = segment_fixed(5.0, 2.0).unwrap();
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[2], Window::new(4.0, 5.0));
    }

    #[test]
    fn test_window_larger_than_piece() {
        let windows = segment_fixed(1.5, 4.0).unwrap();
        assert_eq!(windows, vec![Window::new(0.0, 1.5)]);
    }

    #[test]
    fn test_zero_duration() {
        let windows = segment_fixed(0.0, 2.0).unwrap();
        assert_eq!(windows, vec![Window::new(0.0, 0.0)]);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            segment_fixed(10.0, 0.0),
            Err(AnalysisError::InvalidParameter(_))
        ));
        assert!(segment_fixed(10.0, -1.0).is_err());
        assert!(segment_fixed(-1.0, 1.0).is_err());
        assert!(segment_fixed(f32::NAN, 1.0).is_err());
    }

    #[test]
    fn test_coverage_sweep() {
        let durations = [0.3, 1.0, 2.5, 7.77, 8.0, 59.9, 181.25, 600.0];
        let sizes = [0.1, 0.5, 0.75, 1.0, 1.3, 2.0, 3.7, 4.0];

        for &duration in &durations {
            for &size in &sizes {
                let windows = segment_fixed(duration, size).unwrap();
                assert!(
                    is_contiguous(&windows, duration),
                    "windows not contiguous for duration={} size={}",
                    duration,
                    size
                );
                for w in &windows {
                    assert!(w.end > w.start, "empty window {:?} (d={}, s={})", w, duration, size);
                    assert!(w.duration() <= size + 1e-4);
                }
                let covered: f32 = windows.iter().map(|w| w.duration()).sum();
                assert!(
                    (covered - duration).abs() < 1e-3 * duration.max(1.0),
                    "union {} != duration {}",
                    covered,
                    duration
                );
            }
        }
    }

    #[test]
    fn test_float_sliver_folded() {
        // 0.3 / 0.1 is not exact in f32; no sliver window may remain
        let windows = segment_fixed(0.3, 0.1).unwrap();
        assert!(windows.iter().all(|w| w.duration() >= MIN_TAIL_WINDOW));
        assert_eq!(windows.last().unwrap().end, 0.3);
    }
}
