// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Phonetic data for one dictionary word.
/// This is the "value" in the phoneme store, keyed by the lowercase word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhonemeEntry {
    pub word: String,
    /// ARPAbet codes in order; vowels carry a trailing stress digit (0/1/2).
    /// e.g., ["K", "AE1", "T"] for "cat".
    pub phonemes: Vec<String>,
    pub syllables: u32,
    /// Vowel codes only, stress stripped. e.g., ["AE"] for "cat".
    pub rhyme_pattern: Vec<String>,
}

impl PhonemeEntry {
    /// The rhyme pattern joined into a single comparable key.
    pub fn pattern_key(&self) -> String {
        self.rhyme_pattern.join("-")
    }
}

/// Discrete quality bucket for a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Perfect,
    Strong,
    Standard,
    Weak,
    Manual,
    Slant,
    Unknown,
}

impl Tier {
    /// Sort priority, higher first.
    pub fn priority(self) -> u8 {
        match self {
            Tier::Perfect => 6,
            Tier::Strong => 5,
            Tier::Manual => 4,
            Tier::Slant => 3,
            Tier::Standard => 2,
            Tier::Weak => 1,
            Tier::Unknown => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Perfect => "perfect",
            Tier::Strong => "strong",
            Tier::Standard => "standard",
            Tier::Weak => "weak",
            Tier::Manual => "manual",
            Tier::Slant => "slant",
            Tier::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One ranked rhyme suggestion. Recomputed per query, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub word: String,
    pub score: f64,
    pub tier: Tier,
}

/// Ordering applied to a candidate list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Frequency,
    Alphabetical,
    Phonetic,
    Similarity,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [
        SortMode::Frequency,
        SortMode::Alphabetical,
        SortMode::Phonetic,
        SortMode::Similarity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Frequency => "frequency",
            SortMode::Alphabetical => "alphabetical",
            SortMode::Phonetic => "phonetic",
            SortMode::Similarity => "similarity",
        }
    }

    /// The mode after this one, wrapping around. Used by hosts that cycle modes.
    pub fn next(self) -> SortMode {
        let idx = SortMode::ALL.iter().position(|&m| m == self).unwrap_or(0);
        SortMode::ALL[(idx + 1) % SortMode::ALL.len()]
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "frequency" | "default" | "freq" => Ok(SortMode::Frequency),
            "alphabetical" | "alpha" | "abc" => Ok(SortMode::Alphabetical),
            "phonetic" | "grouped" => Ok(SortMode::Phonetic),
            "similarity" | "tiered" | "score" => Ok(SortMode::Similarity),
            other => Err(format!("unknown sort mode '{}'", other)),
        }
    }
}

/// Lowercases and trims a word for use as a lookup or override key.
pub fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_priority_order() {
        let order = [
            Tier::Perfect,
            Tier::Strong,
            Tier::Manual,
            Tier::Slant,
            Tier::Standard,
            Tier::Weak,
            Tier::Unknown,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].priority() > pair[1].priority(), "{:?}", pair);
        }
    }

    #[test]
    fn sort_mode_parses_aliases() {
        assert_eq!("Alpha".parse::<SortMode>(), Ok(SortMode::Alphabetical));
        assert_eq!(" tiered ".parse::<SortMode>(), Ok(SortMode::Similarity));
        assert!("loudest".parse::<SortMode>().is_err());
    }

    #[test]
    fn sort_mode_cycles() {
        assert_eq!(SortMode::Similarity.next(), SortMode::Frequency);
        assert_eq!(SortMode::Frequency.next(), SortMode::Alphabetical);
    }

    #[test]
    fn pattern_key_joins_vowels() {
        let entry = PhonemeEntry {
            word: "pizza".into(),
            phonemes: vec!["P".into(), "IY1".into(), "T".into(), "S".into(), "AH0".into()],
            syllables: 2,
            rhyme_pattern: vec!["IY".into(), "AH".into()],
        };
        assert_eq!(entry.pattern_key(), "IY-AH");
    }
}
