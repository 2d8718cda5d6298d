//! Progression summary statistics

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::result::ChordEvent;

/// Aggregate statistics over a chord timeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Number of chord events, "no chord" included
    pub event_count: usize,

    /// Number of distinct chord names, "no chord" excluded
    pub distinct_chords: usize,

    /// Seconds covered by the timeline
    pub total_duration: f32,

    /// Duration-weighted mean confidence; "no chord" spans count as 0
    pub average_confidence: f32,

    /// How many events each chord name occurs in ("no chord" excluded)
    pub chord_counts: BTreeMap<String, usize>,
}

/// Summarize a chord timeline
pub fn summarize(events: &[ChordEvent]) -> AnalysisSummary {
    let mut chord_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_duration = 0.0f32;
    let mut weighted = 0.0f32;

    for event in events {
        let duration = event.duration().max(0.0);
        total_duration += duration;
        if event.is_no_chord() {
            continue;
        }
        weighted += event.confidence * duration;
        *chord_counts.entry(event.chord_name.clone()).or_insert(0) += 1;
    }

    let average_confidence = if total_duration > 0.0 {
        weighted / total_duration
    } else {
        0.0
    };

    AnalysisSummary {
        event_count: events.len(),
        distinct_chords: chord_counts.len(),
        total_duration,
        average_confidence,
        chord_counts,
    }
}

impl AnalysisSummary {
    /// Chord names ordered by play count (most played first, then by name)
    pub fn most_played(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = self
            .chord_counts
            .iter()
            .map(|(name, &count)| (name.as_str(), count))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        counts
    }
}
