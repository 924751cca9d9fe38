// src/core/sort.rs
use crate::core::phonemes::PhonemeStore;
use crate::core::types::{normalize, Candidate, SortMode};
use crate::core::usage::FrequencySource;
use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;

/// Inputs the sort strategies read besides the candidates themselves.
pub struct SortContext<'a> {
    pub vocabulary: &'a [String],
    pub store: &'a PhonemeStore,
    pub frequencies: &'a dyn FrequencySource,
}

/// Lexicographic order that ignores case first, then falls back to the raw
/// text so the order is total.
pub fn alphabetical(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Orders `candidates` in place according to `mode`.
pub fn sort_candidates(candidates: &mut Vec<Candidate>, mode: SortMode, ctx: &SortContext<'_>) {
    match mode {
        SortMode::Frequency => by_frequency(candidates, ctx),
        SortMode::Alphabetical => candidates.sort_by(|a, b| alphabetical(&a.word, &b.word)),
        SortMode::Phonetic => by_phonetic_group(candidates, ctx.store),
        SortMode::Similarity => by_similarity(candidates),
    }
}

/// Most-used first; ties keep vocabulary order. Words outside the
/// vocabulary (manual additions) follow, alphabetically.
fn by_frequency(candidates: &mut [Candidate], ctx: &SortContext<'_>) {
    let mut position: HashMap<String, usize> = HashMap::new();
    for (i, word) in ctx.vocabulary.iter().enumerate() {
        position.entry(normalize(word)).or_insert(i);
    }
    candidates.sort_by(|a, b| {
        let pa = position.get(&a.word).copied().unwrap_or(usize::MAX);
        let pb = position.get(&b.word).copied().unwrap_or(usize::MAX);
        ctx.frequencies
            .count(&b.word)
            .cmp(&ctx.frequencies.count(&a.word))
            .then(pa.cmp(&pb))
            .then_with(|| alphabetical(&a.word, &b.word))
    });
}

/// Bucket key: the last two vowel tokens of the rhyme pattern, or the last
/// one for single-vowel words.
pub fn phonetic_bucket(store: &PhonemeStore, word: &str) -> Option<String> {
    let pattern = &store.get(word)?.rhyme_pattern;
    let tail = pattern.len().min(2);
    if tail == 0 {
        return None;
    }
    Some(pattern[pattern.len() - tail..].join("-"))
}

/// Largest buckets first, ties by bucket key; alphabetical inside a bucket.
/// Words without phonetic data form a final bucket of their own.
fn by_phonetic_group(candidates: &mut Vec<Candidate>, store: &PhonemeStore) {
    let mut buckets: HashMap<Option<String>, Vec<Candidate>> = HashMap::new();
    for candidate in candidates.drain(..) {
        buckets
            .entry(phonetic_bucket(store, &candidate.word))
            .or_default()
            .push(candidate);
    }
    let mut buckets: Vec<(Option<String>, Vec<Candidate>)> = buckets.into_iter().collect();
    buckets.sort_by(|(ka, va), (kb, vb)| {
        ka.is_none()
            .cmp(&kb.is_none())
            .then(vb.len().cmp(&va.len()))
            .then_with(|| ka.cmp(kb))
    });
    for (_, mut bucket) in buckets {
        bucket.sort_by(|a, b| alphabetical(&a.word, &b.word));
        candidates.extend(bucket);
    }
}

/// Tier priority, then score, both descending; then alphabetical.
fn by_similarity(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        Reverse(a.tier.priority())
            .cmp(&Reverse(b.tier.priority()))
            .then(b.score.total_cmp(&a.score))
            .then_with(|| alphabetical(&a.word, &b.word))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tier::{classify, Membership};
    use crate::core::types::Tier;

    fn store() -> PhonemeStore {
        PhonemeStore::from_cmudict(
            "BAT  B AE1 T\nAPPLE  AE1 P AH0 L\nCHAPEL  CH AE1 P AH0 L\nHAT  HH AE1 T\nTABLE  T EY1 B AH0 L\nMAT  M AE1 T\n",
        )
        .unwrap()
    }

    fn plain(words: &[&str]) -> Vec<Candidate> {
        words
            .iter()
            .map(|w| classify(w, Some(0.5), Membership::default()))
            .collect()
    }

    fn words(list: &[Candidate]) -> Vec<&str> {
        list.iter().map(|c| c.word.as_str()).collect()
    }

    fn sorted(words_in: &[&str], mode: SortMode, freq: &HashMap<String, u64>, vocab: &[String]) -> Vec<String> {
        let store = store();
        let ctx = SortContext {
            vocabulary: vocab,
            store: &store,
            frequencies: freq,
        };
        let mut list = plain(words_in);
        sort_candidates(&mut list, mode, &ctx);
        list.into_iter().map(|c| c.word).collect()
    }

    #[test]
    fn alphabetical_sort() {
        let out = sorted(&["bat", "apple"], SortMode::Alphabetical, &HashMap::new(), &[]);
        assert_eq!(out, vec!["apple", "bat"]);
    }

    #[test]
    fn frequency_sort_breaks_ties_by_vocabulary_order() {
        let vocab: Vec<String> = ["mat", "hat", "bat"].iter().map(|s| s.to_string()).collect();
        let freq: HashMap<String, u64> = [("bat".to_string(), 5)].into_iter().collect();
        let out = sorted(&["hat", "zebra", "bat", "mat"], SortMode::Frequency, &freq, &vocab);
        assert_eq!(out, vec!["bat", "mat", "hat", "zebra"]);
    }

    #[test]
    fn phonetic_sort_orders_buckets_by_size() {
        let out = sorted(
            &["table", "hat", "chapel", "bat", "apple", "mystery"],
            SortMode::Phonetic,
            &HashMap::new(),
            &[],
        );
        // AE: bat, hat; AE-AH: apple, chapel; EY-AH: table; no data: mystery
        assert_eq!(out, vec!["bat", "hat", "apple", "chapel", "table", "mystery"]);
    }

    #[test]
    fn similarity_sort_uses_tier_then_score() {
        let mut list = vec![
            classify("cut", Some(0.9), Membership::default()),
            classify("zoo", Some(0.1), Membership { manual: true, slant: false }),
            classify("bat", Some(1.0), Membership::default()),
            classify("hut", Some(0.6), Membership::default()),
            classify("dog", Some(0.3), Membership::default()),
            classify("nil", None, Membership::default()),
            classify("cap", Some(0.9), Membership { manual: false, slant: true }),
        ];
        by_similarity(&mut list);
        assert_eq!(words(&list), vec!["bat", "cut", "hut", "zoo", "cap", "dog", "nil"]);
        assert_eq!(list.last().unwrap().tier, Tier::Unknown);
    }

    #[test]
    fn bucket_uses_last_two_vowels() {
        let store = store();
        assert_eq!(phonetic_bucket(&store, "apple").as_deref(), Some("AE-AH"));
        assert_eq!(phonetic_bucket(&store, "bat").as_deref(), Some("AE"));
        assert_eq!(phonetic_bucket(&store, "nothing"), None);
    }
}
