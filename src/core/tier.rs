// src/core/tier.rs
use crate::core::types::{Candidate, Tier};

/// Representative score shown for manual additions that do not rhyme well on their own.
pub const MANUAL_SCORE: f64 = 0.7;
/// Representative score shown for user-tagged slant rhymes.
pub const SLANT_SCORE: f64 = 0.5;

const STRONG_MIN: f64 = 0.5;
const STANDARD_MIN: f64 = 0.2;

/// Override membership of one (base, candidate) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Membership {
    pub manual: bool,
    pub slant: bool,
}

/// Tier for a computed score alone.
pub fn tier_for_score(score: f64) -> Tier {
    if score >= 1.0 {
        Tier::Perfect
    } else if score >= STRONG_MIN {
        Tier::Strong
    } else if score >= STANDARD_MIN {
        Tier::Standard
    } else {
        Tier::Weak
    }
}

/// Final tier and displayed score for a candidate.
///
/// `score` is `None` when either word lacks phonetic data. Slant tagging
/// always wins; manual additions keep a perfect or strong computed tier and
/// are otherwise shown as `manual`.
pub fn classify(word: &str, score: Option<f64>, membership: Membership) -> Candidate {
    let (score, tier) = if membership.slant {
        (SLANT_SCORE, Tier::Slant)
    } else {
        match score.map(|s| (s, tier_for_score(s))) {
            Some((s, tier @ (Tier::Perfect | Tier::Strong))) => (s, tier),
            _ if membership.manual => (MANUAL_SCORE, Tier::Manual),
            Some((s, tier)) => (s, tier),
            None => (0.0, Tier::Unknown),
        }
    };
    Candidate {
        word: word.to_string(),
        score,
        tier,
    }
}

/// Splits an already-ordered list into runs of equal tier, for drawing
/// separators between groups.
pub fn group_by_tier(candidates: &[Candidate]) -> Vec<(Tier, &[Candidate])> {
    candidates
        .chunk_by(|a, b| a.tier == b.tier)
        .map(|run| (run[0].tier, run))
        .collect()
}
