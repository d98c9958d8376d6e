//! Ethogram vocabulary
//!
//! The fixed catalog of behavior codes recorded by the annotator. Declaration
//! order is the display order: a behavior's rank is its position in
//! [`ETHOGRAM`], independent of which behaviors appear in a given dataset.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Abbreviation → label pairs, in display order
pub const ETHOGRAM: [(&str, &str); 9] = [
    ("A", "Away"),
    ("L", "Lying"),
    ("Si", "Sitting"),
    ("S", "Standing"),
    ("W", "Walking"),
    ("P", "Pacing"),
    ("V", "Vocalizing"),
    ("Sc", "Scratching"),
    ("D", "Destructive"),
];

/// A behavior from the ethogram, identified by its rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Behavior(usize);

impl Behavior {
    /// Resolve an annotation code (exact match, surrounding whitespace ignored)
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        ETHOGRAM.iter().position(|(c, _)| *c == code).map(Behavior)
    }

    /// Resolve a full label, case-insensitively
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        ETHOGRAM
            .iter()
            .position(|(_, l)| l.eq_ignore_ascii_case(label))
            .map(Behavior)
    }

    /// Resolve either a code or a label; codes take precedence
    pub fn parse(value: &str) -> Option<Self> {
        Self::from_code(value).or_else(|| Self::from_label(value))
    }

    /// Behavior at a given rank
    pub fn from_rank(rank: usize) -> Option<Self> {
        (rank < ETHOGRAM.len()).then_some(Behavior(rank))
    }

    /// Position in the display ordering (0..K-1)
    pub fn rank(&self) -> usize {
        self.0
    }

    pub fn code(&self) -> &'static str {
        ETHOGRAM[self.0].0
    }

    pub fn label(&self) -> &'static str {
        ETHOGRAM[self.0].1
    }

    /// All behaviors in display order
    pub fn all() -> impl Iterator<Item = Behavior> {
        (0..ETHOGRAM.len()).map(Behavior)
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Behavior {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Behavior {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Behavior::parse(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown behavior: {value}")))
    }
}
