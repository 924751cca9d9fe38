// src/core/scorer.rs
use crate::core::phonemes::{is_vowel, strip_stress};

/// Revision of the hand-authored vowel table below. Bump on any edit so
/// cached scores keyed by it can be discarded.
pub const VOWEL_TABLE_VERSION: u32 = 1;

const EXACT: f64 = 1.0;
const CLOSE: f64 = 0.8;
const ADJACENT: f64 = 0.6;
const DISTANT: f64 = 0.3;

/// Vowels that sound nearly interchangeable at the end of a line.
const CLOSE_GROUPS: &[&[&str]] = &[
    &["AA", "AO"],
    &["AE", "AH"],
    &["IH", "EH", "IY"],
    &["UH", "UW"],
    &["AW", "OW"],
    &["AY", "EY"],
];

/// Pairs of close groups (by index into `CLOSE_GROUPS`) whose members are
/// neighbours in the vowel space.
const ADJACENT_GROUPS: &[(usize, usize)] = &[
    (0, 1), // AA/AO ~ AE/AH
    (0, 4), // AA/AO ~ AW/OW
    (1, 2), // AE/AH ~ IH/EH/IY
    (1, 3), // AE/AH ~ UH/UW
    (2, 5), // IH/EH/IY ~ AY/EY
    (3, 4), // UH/UW ~ AW/OW
];

/// Ungrouped vowels and the groups they sit next to.
const ADJACENT_LOOSE: &[(&str, usize)] = &[
    ("ER", 1), // ER ~ AE/AH
    ("ER", 3), // ER ~ UH/UW
    ("OY", 0), // OY ~ AA/AO
    ("OY", 5), // OY ~ AY/EY
];

fn group_of(vowel: &str) -> Option<usize> {
    CLOSE_GROUPS.iter().position(|g| g.contains(&vowel))
}

fn groups_adjacent(a: usize, b: usize) -> bool {
    ADJACENT_GROUPS
        .iter()
        .any(|&(x, y)| (x, y) == (a, b) || (x, y) == (b, a))
}

/// Partial credit for two distinct stress-stripped vowels.
pub fn vowel_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return EXACT;
    }
    match (group_of(a), group_of(b)) {
        (Some(ga), Some(gb)) if ga == gb => CLOSE,
        (Some(ga), Some(gb)) if groups_adjacent(ga, gb) => ADJACENT,
        (None, Some(g)) if ADJACENT_LOOSE.contains(&(a, g)) => ADJACENT,
        (Some(g), None) if ADJACENT_LOOSE.contains(&(b, g)) => ADJACENT,
        _ => DISTANT,
    }
}

/// Credit for one aligned position.
fn position_credit(a: &str, b: &str) -> f64 {
    let (a, b) = (strip_stress(a), strip_stress(b));
    if a == b {
        EXACT
    } else if is_vowel(a) && is_vowel(b) {
        vowel_similarity(a, b)
    } else {
        0.0
    }
}

/// Graded similarity in [0, 1] between two rhyming parts, aligned from the
/// stress syllable. Identical parts score exactly 1.0.
pub fn score(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let mut total = 0.0;
    let mut all_exact = true;
    for (pa, pb) in a.iter().zip(b.iter()) {
        let credit = position_credit(pa, pb);
        if credit < EXACT {
            all_exact = false;
        }
        total += credit;
    }

    if a.len() == b.len() && all_exact {
        return 1.0;
    }

    let longest = a.len().max(b.len());
    let base = total / longest as f64;
    let diff = a.len().abs_diff(b.len()) as f64;
    let penalty = (1.0 - 0.1 * diff).max(0.5);
    (base * penalty).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identical_parts_are_perfect() {
        for part in ["AE1 T", "IY1 T S AH0", "OW1", "AE1 M P AH0 L"] {
            let p = codes(part);
            assert_eq!(score(&p, &p.clone()), 1.0, "{}", part);
        }
    }

    #[test]
    fn stress_digits_are_ignored_for_matching() {
        assert_eq!(score(&codes("AE1 T"), &codes("AE2 T")), 1.0);
    }

    #[test]
    fn close_vowel_gets_partial_credit() {
        // cat vs cut
        assert!(close(score(&codes("AE1 T"), &codes("AH1 T")), 0.9));
    }

    #[test]
    fn adjacent_and_distant_vowels() {
        assert!(close(vowel_similarity("AA", "AE"), ADJACENT));
        assert!(close(vowel_similarity("ER", "AH"), ADJACENT));
        assert!(close(vowel_similarity("UW", "AY"), DISTANT));
        assert_eq!(vowel_similarity("IY", "EH"), vowel_similarity("EH", "IY"));
    }

    #[test]
    fn consonant_mismatch_scores_zero_at_that_position() {
        // (1.0 + 0.0) / 2
        assert!(close(score(&codes("AE1 T"), &codes("AE1 D")), 0.5));
    }

    #[test]
    fn length_mismatch_is_penalized() {
        // (1 + 1) / 3 * 0.9
        let s = score(&codes("AE1 T"), &codes("AE1 T S"));
        assert!(close(s, 2.0 / 3.0 * 0.9));
    }

    #[test]
    fn penalty_floors_at_half() {
        // one exact position out of 8, penalty capped at 0.5
        let s = score(&codes("OW1"), &codes("OW1 K S T R AH0 N Z"));
        assert!(close(s, 1.0 / 8.0 * 0.5));
    }

    #[test]
    fn empty_input_scores_zero() {
        assert_eq!(score(&[], &codes("AE1 T")), 0.0);
        assert_eq!(score(&codes("AE1 T"), &[]), 0.0);
    }
}
