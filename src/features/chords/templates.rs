//! Chord template library
//!
//! A template is a root plus a set of pitch classes. The standard library
//! holds 7 qualities x 12 roots, ordered quality-first then root C..B. That
//! order is the last tie-break in matching. It only decides between templates
//! whose tones weigh the same from their roots, e.g. Csus2 and Gsus4 over an
//! even C-D-G, which resolves to the sus2 reading.

use std::collections::HashSet;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::features::chroma::{note_name, PITCH_CLASSES};

/// Chord quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordQuality {
    /// Root, major third, fifth
    Major,
    /// Root, minor third, fifth
    Minor,
    /// Major triad plus minor seventh
    Dominant7,
    /// Major triad plus major seventh
    Major7,
    /// Minor triad plus minor seventh
    Minor7,
    /// Root, major second, fifth
    Sus2,
    /// Root, perfect fourth, fifth
    Sus4,
}

impl ChordQuality {
    /// Every quality, in canonical library order
    pub const ALL: [ChordQuality; 7] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Dominant7,
        ChordQuality::Major7,
        ChordQuality::Minor7,
        ChordQuality::Sus2,
        ChordQuality::Sus4,
    ];

    /// Semitone offsets from the root
    pub fn intervals(&self) -> &'static [u8] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Dominant7 => &[0, 4, 7, 10],
            ChordQuality::Major7 => &[0, 4, 7, 11],
            ChordQuality::Minor7 => &[0, 3, 7, 10],
            ChordQuality::Sus2 => &[0, 2, 7],
            ChordQuality::Sus4 => &[0, 5, 7],
        }
    }

    /// Symbol appended to the root name ("" for major, "m", "7", ...)
    pub fn suffix(&self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::Sus2 => "sus2",
            ChordQuality::Sus4 => "sus4",
        }
    }
}

/// One chord: display name, root, quality and pitch-class set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordTemplate {
    name: String,
    root: usize,
    quality: ChordQuality,
    mask: u16,
}

impl ChordTemplate {
    /// Standard template for `root` (pitch class, wraps modulo 12) and `quality`
    ///
    /// Named with sharps, e.g. `"F#m"`, `"G7"`, `"Cmaj7"`.
    pub fn new(root: usize, quality: ChordQuality) -> Self {
        let root = root % PITCH_CLASSES;
        let mask = quality
            .intervals()
            .iter()
            .fold(0u16, |m, &i| m | 1 << ((root + i as usize) % PITCH_CLASSES));
        Self {
            name: format!("{}{}", note_name(root), quality.suffix()),
            root,
            quality,
            mask,
        }
    }

    /// Template with an explicit name and pitch-class set
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidParameter` for an empty name, an empty
    /// set, or a pitch class outside 0-11
    pub fn with_pitch_classes(
        name: impl Into<String>,
        root: usize,
        quality: ChordQuality,
        pitch_classes: &[usize],
    ) -> Result<Self, AnalysisError> {
        let name = name.into();
        if name.is_empty() {
            return Err(AnalysisError::InvalidParameter(
                "Chord template name must not be empty".to_string(),
            ));
        }
        if pitch_classes.is_empty() {
            return Err(AnalysisError::InvalidParameter(format!(
                "Chord template '{}' has no pitch classes",
                name
            )));
        }
        let mut mask = 0u16;
        for &pc in pitch_classes {
            if pc >= PITCH_CLASSES {
                return Err(AnalysisError::InvalidParameter(format!(
                    "Chord template '{}' has pitch class {} outside 0-11",
                    name, pc
                )));
            }
            mask |= 1 << pc;
        }
        Ok(Self {
            name,
            root: root % PITCH_CLASSES,
            quality,
            mask,
        })
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root pitch class
    pub fn root(&self) -> usize {
        self.root
    }

    /// Quality
    pub fn quality(&self) -> ChordQuality {
        self.quality
    }

    /// Whether `pitch_class` belongs to the chord
    pub fn contains(&self, pitch_class: usize) -> bool {
        self.mask & (1 << (pitch_class % PITCH_CLASSES)) != 0
    }

    /// Number of distinct pitch classes
    pub fn cardinality(&self) -> usize {
        self.mask.count_ones() as usize
    }

    /// Member pitch classes, ascending
    pub fn pitch_classes(&self) -> Vec<usize> {
        (0..PITCH_CLASSES).filter(|&pc| self.contains(pc)).collect()
    }
}

/// Immutable, ordered set of chord templates
///
/// Build once and share by reference; matching never mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordLibrary {
    templates: Vec<ChordTemplate>,
}

impl ChordLibrary {
    /// Library from templates in canonical (tie-break) order
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidParameter` if the list is empty or two
    /// templates share a name
    pub fn new(templates: Vec<ChordTemplate>) -> Result<Self, AnalysisError> {
        if templates.is_empty() {
            return Err(AnalysisError::InvalidParameter(
                "Chord library must contain at least one template".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for t in &templates {
            if !seen.insert(t.name()) {
                return Err(AnalysisError::InvalidParameter(format!(
                    "Duplicate chord template name '{}'",
                    t.name()
                )));
            }
        }
        Ok(Self { templates })
    }

    /// Major, minor, 7, maj7, m7, sus2 and sus4 chords on all 12 roots
    pub fn standard() -> Self {
        let templates = ChordQuality::ALL
            .iter()
            .flat_map(|&q| (0..PITCH_CLASSES).map(move |root| ChordTemplate::new(root, q)))
            .collect();
        Self { templates }
    }

    /// Shared process-wide standard library, built on first use
    pub fn shared() -> &'static ChordLibrary {
        static STANDARD: OnceLock<ChordLibrary> = OnceLock::new();
        STANDARD.get_or_init(ChordLibrary::standard)
    }

    /// Templates in canonical order
    pub fn templates(&self) -> &[ChordTemplate] {
        &self.templates
    }

    /// Number of templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Always false for a constructed library
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Look a template up by name
    pub fn get(&self, name: &str) -> Option<&ChordTemplate> {
        self.templates.iter().find(|t| t.name() == name)
    }
}
