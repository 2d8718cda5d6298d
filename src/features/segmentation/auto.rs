//! Automatic window-size estimation
//!
//! Groups near-simultaneous onsets into chord strikes and sizes windows from
//! the median gap between strikes, so a window usually holds one strike.
//! Pure function of the onset list.

use serde::{Deserialize, Serialize};

use crate::config::AutoWindowConfig;

/// Result of auto window estimation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoWindowEstimate {
    /// Chosen window size in seconds
    pub window_size: f32,

    /// Number of chord strikes found after onset clustering
    pub strike_count: usize,

    /// Median gap between strikes in seconds (None with fewer than two strikes)
    pub median_gap: Option<f32>,
}

/// Estimate a window size from note onsets
///
/// # Algorithm
///
/// 1. Sort onsets; an onset more than `onset_cluster_gap` after the previous
///    onset starts a new strike
/// 2. Take the median gap between consecutive strikes
/// 3. Window = `gap_scale * median`, clamped to `[min_window, max_window]`
///
/// Fewer than two strikes gives `fallback_window` (clamped the same way).
pub fn estimate_window_size(onsets: &[f32], config: &AutoWindowConfig) -> AutoWindowEstimate {
    let strikes = cluster_strikes(onsets, config.onset_cluster_gap);

    let gaps: Vec<f32> = strikes.windows(2).map(|pair| pair[1] - pair[0]).collect();
    let median_gap = median(&gaps);

    let raw = match median_gap {
        Some(gap) => gap * config.gap_scale,
        None => config.fallback_window,
    };
    let window_size = raw.clamp(config.min_window, config.max_window);

    log::debug!(
        "Auto window: {} onsets -> {} strikes, median gap {:?}, window {:.3}s",
        onsets.len(),
        strikes.len(),
        median_gap,
        window_size
    );

    AutoWindowEstimate {
        window_size,
        strike_count: strikes.len(),
        median_gap,
    }
}

/// First onset of each strike, in time order
fn cluster_strikes(onsets: &[f32], cluster_gap: f32) -> Vec<f32> {
    let mut sorted: Vec<f32> = onsets.iter().copied().filter(|t| t.is_finite()).collect();
    sorted.sort_by(f32::total_cmp);

    let mut strikes = Vec::new();
    let mut last: Option<f32> = None;
    for t in sorted {
        match last {
            Some(prev) if t - prev <= cluster_gap => {}
            _ => strikes.push(t),
        }
        last = Some(t);
    }
    strikes
}

fn median(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) * 0.5)
    } else {
        Some(sorted[mid])
    }
}
