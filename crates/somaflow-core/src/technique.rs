//! Built-in breathing techniques.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Name of a built-in technique. Serialized with its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TechniqueName {
    #[serde(rename = "Resonant")]
    Resonant,
    #[serde(rename = "4-7-8")]
    FourSevenEight,
    #[serde(rename = "Box Breathing")]
    BoxBreathing,
}

impl TechniqueName {
    pub const ALL: [TechniqueName; 3] = [
        TechniqueName::Resonant,
        TechniqueName::FourSevenEight,
        TechniqueName::BoxBreathing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TechniqueName::Resonant => "Resonant",
            TechniqueName::FourSevenEight => "4-7-8",
            TechniqueName::BoxBreathing => "Box Breathing",
        }
    }

    /// Resolve a persisted name, falling back to `Resonant` for anything
    /// that is no longer in the catalogue.
    pub fn from_stored(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| {
            tracing::warn!(stored = raw, "unknown stored technique, using Resonant");
            TechniqueName::Resonant
        })
    }

    pub fn technique(&self) -> &'static Technique {
        Technique::lookup(*self)
    }
}

impl Default for TechniqueName {
    fn default() -> Self {
        TechniqueName::Resonant
    }
}

impl fmt::Display for TechniqueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TechniqueName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resonant" => Ok(TechniqueName::Resonant),
            "4-7-8" | "478" => Ok(TechniqueName::FourSevenEight),
            "box breathing" | "box" | "box-breathing" => Ok(TechniqueName::BoxBreathing),
            _ => Err(ValidationError::UnknownTechnique(s.to_string())),
        }
    }
}

/// Per-phase durations in seconds. A zero means the phase is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub inhale: u32,
    pub hold: u32,
    pub exhale: u32,
    pub hold2: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Technique {
    pub name: TechniqueName,
    pub description: &'static str,
    pub pattern: Pattern,
}

static TECHNIQUES: [Technique; 3] = [
    Technique {
        name: TechniqueName::Resonant,
        description: "Improve Long COVID, CFS and Dysautonomia symptoms by enhancing autonomic function",
        pattern: Pattern { inhale: 4, hold: 0, exhale: 6, hold2: 0 },
    },
    Technique {
        name: TechniqueName::FourSevenEight,
        description: "Helps reduce stress, improve sleep, and calm the nervous system",
        pattern: Pattern { inhale: 4, hold: 7, exhale: 8, hold2: 0 },
    },
    Technique {
        name: TechniqueName::BoxBreathing,
        description: "Helps reduce stress, enhance focus, and promote calmness",
        pattern: Pattern { inhale: 4, hold: 4, exhale: 4, hold2: 4 },
    },
];

impl Technique {
    pub fn lookup(name: TechniqueName) -> &'static Technique {
        match name {
            TechniqueName::Resonant => &TECHNIQUES[0],
            TechniqueName::FourSevenEight => &TECHNIQUES[1],
            TechniqueName::BoxBreathing => &TECHNIQUES[2],
        }
    }

    pub fn all() -> &'static [Technique] {
        &TECHNIQUES
    }
}
