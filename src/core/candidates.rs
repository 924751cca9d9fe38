// src/core/candidates.rs
use crate::core::phonemes::PhonemeStore;
use crate::core::scorer;
use crate::core::stress::rhyming_part;
use crate::core::tier::{classify, Membership};
use crate::core::types::{normalize, Candidate, PhonemeEntry};
use crate::overrides::{OverrideStore, WordOverrides};
use std::collections::HashSet;

/// Everything a candidate source needs to answer one query for one base word.
/// Borrowed from the engine for the duration of a single call.
pub struct RhymeQuery<'a> {
    pub base: String,
    pub base_entry: Option<&'a PhonemeEntry>,
    pub store: &'a PhonemeStore,
    pub vocabulary: &'a [String],
    pub overrides: Option<&'a WordOverrides>,
}

impl<'a> RhymeQuery<'a> {
    pub fn new(
        base: &str,
        store: &'a PhonemeStore,
        vocabulary: &'a [String],
        overrides: &'a OverrideStore,
    ) -> Self {
        let base = normalize(base);
        Self {
            base_entry: store.get(&base),
            overrides: overrides.get(&base),
            base,
            store,
            vocabulary,
        }
    }

    fn rejects(&self, word: &str) -> bool {
        self.overrides.is_some_and(|o| o.rejected.contains(word))
    }

    fn membership(&self, word: &str) -> Membership {
        self.overrides
            .map(|o| Membership {
                manual: o.manual.contains(word),
                slant: o.slant.contains(word),
            })
            .unwrap_or_default()
    }
}

/// A strategy that proposes candidate words (lowercase) for a query.
pub trait CandidateSource {
    fn name(&self) -> &'static str;
    fn candidates(&self, query: &RhymeQuery<'_>) -> Vec<String>;
}

/// Coarse path: vocabulary words whose vowel skeleton equals the base word's.
/// Skips the base itself, rejected words, and words without phonetic data.
pub struct PatternSource;

impl CandidateSource for PatternSource {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn candidates(&self, query: &RhymeQuery<'_>) -> Vec<String> {
        let Some(base_entry) = query.base_entry else {
            return Vec::new();
        };
        let base_key = base_entry.pattern_key();
        let mut seen = HashSet::new();
        query
            .vocabulary
            .iter()
            .map(|w| normalize(w))
            .filter(|w| *w != query.base && !query.rejects(w))
            .filter(|w| {
                query
                    .store
                    .get(w)
                    .is_some_and(|e| e.pattern_key() == base_key)
            })
            .filter(|w| seen.insert(w.clone()))
            .collect()
    }
}

/// The user's manual additions for the base word. Rejection does not apply.
pub struct ManualSource;

impl CandidateSource for ManualSource {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn candidates(&self, query: &RhymeQuery<'_>) -> Vec<String> {
        query
            .overrides
            .map(|o| {
                o.manual
                    .iter()
                    .filter(|w| **w != query.base)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Deduplicated union of every source's output, in source order.
pub fn generate(query: &RhymeQuery<'_>, sources: &[&dyn CandidateSource]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut words = Vec::new();
    for source in sources {
        let found = source.candidates(query);
        tracing::trace!(source = source.name(), count = found.len(), "candidate source");
        for word in found {
            if seen.insert(word.clone()) {
                words.push(word);
            }
        }
    }
    words
}

/// The sources used by the engine: pattern matches, then manual additions.
pub const DEFAULT_SOURCES: [&dyn CandidateSource; 2] = [&PatternSource, &ManualSource];

/// Fine path: scores one word against the base word's rhyming part and
/// applies override tiers.
pub fn score_word(query: &RhymeQuery<'_>, word: &str) -> Candidate {
    let word = normalize(word);
    let base_part = query.base_entry.and_then(|e| rhyming_part(&e.phonemes));
    let word_part = query.store.get(&word).and_then(|e| rhyming_part(&e.phonemes));
    let score = match (base_part, word_part) {
        (Some(a), Some(b)) => Some(scorer::score(a, b)),
        _ => None,
    };
    classify(&word, score, query.membership(&word))
}

pub fn score_candidates(query: &RhymeQuery<'_>, words: &[String]) -> Vec<Candidate> {
    words.iter().map(|w| score_word(query, w)).collect()
}
