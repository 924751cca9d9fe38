// src/core/stress.rs
use crate::core::phonemes::{is_vowel, stress_of};

/// How many trailing phonemes to use when no vowel can be found at all.
const FALLBACK_TAIL: usize = 3;

/// Index where the rhyming part of `phonemes` begins.
///
/// Tried in order, each only if the previous found nothing:
/// 1. first primary-stressed code (`1`),
/// 2. first secondary or unstressed code (`2` or `0`),
/// 3. last code that starts with a vowel letter, scanning from the end,
/// 4. the last three codes.
pub fn stress_index(phonemes: &[String]) -> Option<usize> {
    if phonemes.is_empty() {
        return None;
    }
    if let Some(i) = phonemes.iter().position(|p| stress_of(p) == Some(1)) {
        return Some(i);
    }
    if let Some(i) = phonemes
        .iter()
        .position(|p| matches!(stress_of(p), Some(2) | Some(0)))
    {
        return Some(i);
    }
    if let Some(i) = phonemes.iter().rposition(|p| is_vowel(p)) {
        return Some(i);
    }
    Some(phonemes.len().saturating_sub(FALLBACK_TAIL))
}

/// The phonetic suffix starting at the located stress syllable.
pub fn rhyming_part(phonemes: &[String]) -> Option<&[String]> {
    stress_index(phonemes).map(|i| &phonemes[i..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn primary_stress_wins() {
        let p = codes("IH0 G Z AE1 M P AH0 L");
        assert_eq!(rhyming_part(&p).unwrap(), &codes("AE1 M P AH0 L")[..]);
    }

    #[test]
    fn primary_stress_is_first_from_the_left() {
        let p = codes("B EY1 S B AO1 L");
        assert_eq!(stress_index(&p), Some(1));
    }

    #[test]
    fn secondary_or_unstressed_when_no_primary() {
        let p = codes("DH AH0 M EY2");
        assert_eq!(stress_index(&p), Some(1));
        let p = codes("S EY2 L AH0");
        assert_eq!(stress_index(&p), Some(1));
    }

    #[test]
    fn last_bare_vowel_when_no_stress_digits() {
        let p = codes("K AE T AH L");
        assert_eq!(rhyming_part(&p).unwrap(), &codes("AH L")[..]);
    }

    #[test]
    fn last_three_when_no_vowels() {
        let p = codes("P S T S H");
        assert_eq!(rhyming_part(&p).unwrap(), &codes("T S H")[..]);
        let short = codes("HH M");
        assert_eq!(rhyming_part(&short).unwrap(), &short[..]);
    }

    #[test]
    fn empty_sequence_has_no_rhyming_part() {
        assert_eq!(rhyming_part(&[]), None);
    }
}
