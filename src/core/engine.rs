use crate::config::EngineConfig;
use crate::core::candidates::{self, RhymeQuery, DEFAULT_SOURCES};
use crate::core::phonemes::PhonemeStore;
use crate::core::sort::{sort_candidates, SortContext};
use crate::core::types::{normalize, Candidate, PhonemeEntry, SortMode};
use crate::core::usage::{FrequencySource, UsageCounts};
use crate::error::{OverrideError, PersistError};
use crate::overrides::{NullSink, OverrideSink, OverrideSnapshot, OverrideStore};
use crate::persistence::{load_overrides, load_usage, save_usage, JsonFileSink};
use std::fs;
use std::path::Path;

// One engine per session. It owns the lexicon, the user's overrides and the
// active sort mode; hosts pass it around instead of sharing globals.
// NOTE: The phoneme store is `None` when the dataset could not be loaded.
// Every query then returns nothing and `is_enabled()` says so.
pub struct RhymeEngine {
    store: Option<PhonemeStore>,
    vocabulary: Vec<String>,
    overrides: OverrideStore,
    usage: UsageCounts,
    sort_mode: SortMode,
    config: EngineConfig,
}

impl RhymeEngine {
    /// An engine over an in-memory store with no persistence configured.
    pub fn new(store: PhonemeStore, config: EngineConfig) -> Self {
        Self::build(Some(store), config)
    }

    /// An engine whose dataset failed to load.
    pub fn disabled(config: EngineConfig) -> Self {
        Self::build(None, config)
    }

    fn build(store: Option<PhonemeStore>, config: EngineConfig) -> Self {
        Self {
            store,
            vocabulary: Vec::new(),
            overrides: OverrideStore::new(Box::new(NullSink), config.min_manual_word_len),
            usage: UsageCounts::new(),
            sort_mode: config.default_sort_mode,
            config,
        }
    }

    /// Loads everything the config points at. Never fails: a missing dataset
    /// yields a disabled engine, missing or corrupt user data yields empty state.
    pub fn from_config(config: EngineConfig) -> Self {
        let store = load_store(&config);
        if store.is_none() {
            tracing::error!("phoneme dataset unavailable, rhyme engine disabled");
        }
        let mut engine = Self::build(store, config);

        if let Some(path) = engine.config.overrides_path.clone() {
            let snapshot = load_overrides(&path);
            engine = engine.with_overrides(snapshot, Box::new(JsonFileSink::new(path)));
            tracing::info!(bases = engine.overrides.base_count(), "overrides rehydrated");
        }
        if let Some(path) = &engine.config.usage_path {
            engine.usage = load_usage(path);
        }
        engine
    }

    /// Replaces the override store with one rebuilt from `snapshot` that
    /// persists through `sink`.
    pub fn with_overrides(mut self, snapshot: OverrideSnapshot, sink: Box<dyn OverrideSink>) -> Self {
        self.overrides = OverrideStore::from_snapshot(snapshot, sink, self.config.min_manual_word_len);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn lexicon(&self) -> Option<&PhonemeStore> {
        self.store.as_ref()
    }

    pub fn entry(&self, word: &str) -> Option<&PhonemeEntry> {
        self.store.as_ref()?.get(word)
    }

    /// Installs the host's already-filtered word list for upcoming queries.
    pub fn set_vocabulary<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vocabulary = words.into_iter().map(Into::into).collect();
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.sort_mode = mode;
    }

    pub fn cycle_sort_mode(&mut self) -> SortMode {
        self.sort_mode = self.sort_mode.next();
        self.sort_mode
    }

    /// Clears per-session state: vocabulary and sort mode. Overrides and
    /// usage counts are user data and survive.
    pub fn reset(&mut self) {
        self.vocabulary.clear();
        self.sort_mode = self.config.default_sort_mode;
    }

    /// Scored candidates for `base`, in generation order (pattern matches in
    /// vocabulary order, then manual additions).
    pub fn get_candidates(&self, base: &str) -> Vec<Candidate> {
        let Some(store) = &self.store else {
            return Vec::new();
        };
        let query = RhymeQuery::new(base, store, &self.vocabulary, &self.overrides);
        let words = candidates::generate(&query, &DEFAULT_SOURCES);
        let scored = candidates::score_candidates(&query, &words);
        tracing::debug!(
            base = %query.base,
            known = query.base_entry.is_some(),
            count = scored.len(),
            "rhyme query"
        );
        scored
    }

    /// Candidates for `base` ordered by `mode`, using the engine's own usage
    /// counts for the frequency sort.
    pub fn get_candidates_ranked(&self, base: &str, mode: SortMode) -> Vec<Candidate> {
        self.get_candidates_ranked_with(base, mode, &self.usage)
    }

    /// Like `get_candidates_ranked`, with usage counts supplied by the host.
    pub fn get_candidates_ranked_with(
        &self,
        base: &str,
        mode: SortMode,
        frequencies: &dyn FrequencySource,
    ) -> Vec<Candidate> {
        let Some(store) = &self.store else {
            return Vec::new();
        };
        let mut list = self.get_candidates(base);
        let ctx = SortContext {
            vocabulary: &self.vocabulary,
            store,
            frequencies,
        };
        sort_candidates(&mut list, mode, &ctx);
        list
    }

    pub fn get_candidates_sorted_with(
        &self,
        base: &str,
        mode: SortMode,
        frequencies: &dyn FrequencySource,
    ) -> Vec<String> {
        self.get_candidates_ranked_with(base, mode, frequencies)
            .into_iter()
            .map(|c| c.word)
            .collect()
    }

    /// Candidate words for `base` ordered by `mode`.
    pub fn get_candidates_sorted(&self, base: &str, mode: SortMode) -> Vec<String> {
        self.get_candidates_ranked(base, mode)
            .into_iter()
            .map(|c| c.word)
            .collect()
    }

    /// Candidate words ordered by the active sort mode.
    pub fn suggestions(&self, base: &str) -> Vec<String> {
        self.get_candidates_sorted(base, self.sort_mode)
    }

    /// Score and tier for a single pair, whether or not `word` would be
    /// generated as a candidate. `None` while disabled.
    pub fn score_pair(&self, base: &str, word: &str) -> Option<Candidate> {
        let store = self.store.as_ref()?;
        let query = RhymeQuery::new(base, store, &self.vocabulary, &self.overrides);
        Some(candidates::score_word(&query, word))
    }

    pub fn overrides(&self) -> &OverrideStore {
        &self.overrides
    }

    pub fn reject(&mut self, base: &str, word: &str) -> Result<bool, OverrideError> {
        self.overrides.reject(base, word)
    }

    pub fn unreject(&mut self, base: &str, word: &str) -> Result<bool, OverrideError> {
        self.overrides.unreject(base, word)
    }

    pub fn add_manual(&mut self, base: &str, word: &str) -> Result<bool, OverrideError> {
        self.overrides.add_manual(base, word)
    }

    pub fn remove_manual(&mut self, base: &str, word: &str) -> Result<bool, OverrideError> {
        self.overrides.remove_manual(base, word)
    }

    pub fn tag_slant(&mut self, base: &str, word: &str) -> Result<bool, OverrideError> {
        self.overrides.tag_slant(base, word)
    }

    pub fn untag_slant(&mut self, base: &str, word: &str) -> Result<bool, OverrideError> {
        self.overrides.untag_slant(base, word)
    }

    pub fn toggle_slant(&mut self, base: &str, word: &str) -> Result<bool, OverrideError> {
        self.overrides.toggle_slant(base, word)
    }

    pub fn clear_overrides(&mut self) -> Result<bool, OverrideError> {
        self.overrides.clear()
    }

    /// Counts one use of `word` toward the frequency sort.
    pub fn record_usage(&mut self, word: &str) -> u64 {
        self.usage.record(&normalize(word))
    }

    pub fn usage(&self) -> &UsageCounts {
        &self.usage
    }

    pub fn save_usage(&self) -> Result<(), PersistError> {
        if let Some(path) = &self.config.usage_path {
            save_usage(&self.usage, path)
        } else {
            Ok(()) // Don't error if no path is set
        }
    }
}

/// Uses the binary cache unless the dataset file is newer, in which case the
/// dataset is reloaded and the cache rewritten. A stale cache is still used
/// if the dataset itself can no longer be read.
fn load_store(config: &EngineConfig) -> Option<PhonemeStore> {
    let cache = config.phoneme_cache_path.as_deref();
    let cached = cache.filter(|c| c.exists()).and_then(|c| {
        PhonemeStore::load_binary(c)
            .inspect_err(|e| tracing::warn!(path = %c.display(), error = %e, "ignoring phoneme cache"))
            .ok()
    });
    let source = config.phoneme_data_path.as_deref();
    if cached.is_some() && !dataset_is_newer(source, cache) {
        return cached;
    }

    let Some(path) = source else {
        return cached;
    };
    let store = match PhonemeStore::load(path) {
        Ok(store) => store,
        Err(e) if cached.is_some() => {
            tracing::warn!(path = %path.display(), error = %e, "dataset unreadable, using existing phoneme cache");
            return cached;
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "could not load phoneme dataset");
            return None;
        }
    };
    if let Some(cache) = cache {
        if let Err(e) = store.save_binary(cache) {
            tracing::warn!(path = %cache.display(), error = %e, "could not write phoneme cache");
        }
    }
    Some(store)
}

/// True when both files exist and the dataset was modified after the cache.
fn dataset_is_newer(source: Option<&Path>, cache: Option<&Path>) -> bool {
    let modified = |p: Option<&Path>| p.and_then(|p| fs::metadata(p).and_then(|m| m.modified()).ok());
    match (modified(source), modified(cache)) {
        (Some(source), Some(cache)) => source > cache,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Tier;
    use std::collections::HashMap;

    fn engine() -> RhymeEngine {
        let store = PhonemeStore::from_cmudict(
            "CAT  K AE1 T\nBAT  B AE1 T\nHAT  HH AE1 T\nCUT  K AH1 T\nAPPLE  AE1 P AH0 L\n",
        )
        .unwrap();
        let mut engine = RhymeEngine::new(store, EngineConfig::default());
        engine.set_vocabulary(["cat", "hat", "bat", "cut", "apple"]);
        engine
    }

    #[test]
    fn perfect_rhymes_from_pattern_path() {
        let engine = engine();
        let list = engine.get_candidates("Cat");
        let words: Vec<&str> = list.iter().map(|c| c.word.as_str()).collect();
        assert_eq!(words, vec!["hat", "bat"]);
        assert!(list.iter().all(|c| c.tier == Tier::Perfect));
    }

    #[test]
    fn sorted_by_active_mode() {
        let mut engine = engine();
        engine.set_sort_mode(SortMode::Alphabetical);
        assert_eq!(engine.suggestions("cat"), vec!["bat", "hat"]);
        assert_eq!(engine.cycle_sort_mode(), SortMode::Phonetic);
        engine.reset();
        assert_eq!(engine.sort_mode(), SortMode::Frequency);
        assert!(engine.vocabulary().is_empty());
    }

    #[test]
    fn frequency_mode_prefers_used_words() {
        let mut engine = engine();
        engine.record_usage("BAT");
        assert_eq!(engine.get_candidates_sorted("cat", SortMode::Frequency), vec!["bat", "hat"]);
    }

    #[test]
    fn manual_additions_rank_by_similarity() {
        let mut engine = engine();
        engine.add_manual("cat", "cut").unwrap();
        engine.add_manual("cat", "apple").unwrap();
        let ranked = engine.get_candidates_ranked("cat", SortMode::Similarity);
        let summary: Vec<(&str, Tier)> = ranked.iter().map(|c| (c.word.as_str(), c.tier)).collect();
        assert_eq!(
            summary,
            vec![
                ("bat", Tier::Perfect),
                ("hat", Tier::Perfect),
                ("cut", Tier::Strong),
                ("apple", Tier::Manual),
            ]
        );
    }

    #[test]
    fn disabled_engine_returns_nothing() {
        let mut engine = RhymeEngine::disabled(EngineConfig::default());
        engine.set_vocabulary(["cat", "bat"]);
        engine.add_manual("cat", "bat").unwrap();
        assert!(!engine.is_enabled());
        assert!(engine.get_candidates("cat").is_empty());
        assert!(engine.score_pair("cat", "bat").is_none());
    }

    #[test]
    fn host_supplied_frequencies_drive_default_sort() {
        let mut engine = engine();
        engine.record_usage("bat");
        let host: HashMap<String, u64> = [("hat".to_string(), 9)].into_iter().collect();
        assert_eq!(
            engine.get_candidates_sorted_with("cat", SortMode::Frequency, &host),
            vec!["hat", "bat"]
        );
        assert_eq!(engine.get_candidates_sorted("cat", SortMode::Frequency), vec!["bat", "hat"]);
    }

    #[test]
    fn engine_can_move_between_threads() {
        fn assert_send<T: Send>() {}
        assert_send::<RhymeEngine>();
        assert_send::<OverrideStore>();
    }

    #[test]
    fn score_pair_reports_tier() {
        let engine = engine();
        let pair = engine.score_pair("cat", "cut").unwrap();
        assert_eq!(pair.tier, Tier::Strong);
    }
}
