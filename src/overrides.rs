// File: src/overrides.rs
use crate::core::types::normalize;
use crate::error::{ManualRejection, OverrideError, PersistError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// User exceptions for one base word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordOverrides {
    pub rejected: BTreeSet<String>,
    pub manual: BTreeSet<String>,
    pub slant: BTreeSet<String>,
}

impl WordOverrides {
    fn is_empty(&self) -> bool {
        self.rejected.is_empty() && self.manual.is_empty() && self.slant.is_empty()
    }
}

/// Wire shape handed to the persistence sink and read back at startup:
/// for each set, base word -> sorted array of lowercase words.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideSnapshot {
    #[serde(default)]
    pub rejected: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub manual: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub slant: BTreeMap<String, Vec<String>>,
}

/// Durable storage for override snapshots. Called after every mutation.
/// `Send` so an engine holding a sink can live behind a `Mutex` on another thread.
pub trait OverrideSink: Send {
    fn persist(&mut self, snapshot: &OverrideSnapshot) -> Result<(), PersistError>;
}

/// Sink that keeps nothing. Used when no storage is configured.
pub struct NullSink;

impl OverrideSink for NullSink {
    fn persist(&mut self, _snapshot: &OverrideSnapshot) -> Result<(), PersistError> {
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum SetKind {
    Rejected,
    Manual,
    Slant,
}

/// Per-base-word rejected / manual / slant sets, persisted through a sink.
///
/// Mutations return `Ok(true)` when state changed, `Ok(false)` for no-ops.
/// A sink failure is returned as `OverrideError::Persist` after the in-memory
/// change has been applied; the change is kept.
pub struct OverrideStore {
    sets: HashMap<String, WordOverrides>,
    sink: Box<dyn OverrideSink>,
    min_manual_len: usize,
}

impl OverrideStore {
    pub fn new(sink: Box<dyn OverrideSink>, min_manual_len: usize) -> Self {
        Self {
            sets: HashMap::new(),
            sink,
            min_manual_len,
        }
    }

    /// Rebuilds the store from a previously persisted snapshot. Words are
    /// normalized; empty words and self-references are dropped.
    pub fn from_snapshot(
        snapshot: OverrideSnapshot,
        sink: Box<dyn OverrideSink>,
        min_manual_len: usize,
    ) -> Self {
        let mut store = Self::new(sink, min_manual_len);
        let tables = [
            (SetKind::Rejected, snapshot.rejected),
            (SetKind::Manual, snapshot.manual),
            (SetKind::Slant, snapshot.slant),
        ];
        for (kind, table) in tables {
            for (base, words) in table {
                let base = normalize(&base);
                if base.is_empty() {
                    continue;
                }
                for word in words {
                    let word = normalize(&word);
                    if word.is_empty() || word == base {
                        continue;
                    }
                    store.insert(kind, &base, word);
                }
            }
        }
        store
    }

    pub fn snapshot(&self) -> OverrideSnapshot {
        let mut snapshot = OverrideSnapshot::default();
        for (base, sets) in &self.sets {
            let tables = [
                (&mut snapshot.rejected, &sets.rejected),
                (&mut snapshot.manual, &sets.manual),
                (&mut snapshot.slant, &sets.slant),
            ];
            for (table, set) in tables {
                if !set.is_empty() {
                    table.insert(base.clone(), set.iter().cloned().collect());
                }
            }
        }
        snapshot
    }

    /// Overrides for `base`, if any exist.
    pub fn get(&self, base: &str) -> Option<&WordOverrides> {
        self.sets.get(&normalize(base))
    }

    pub fn is_rejected(&self, base: &str, word: &str) -> bool {
        self.get(base)
            .is_some_and(|s| s.rejected.contains(&normalize(word)))
    }

    pub fn is_manual(&self, base: &str, word: &str) -> bool {
        self.get(base).is_some_and(|s| s.manual.contains(&normalize(word)))
    }

    pub fn is_slant(&self, base: &str, word: &str) -> bool {
        self.get(base).is_some_and(|s| s.slant.contains(&normalize(word)))
    }

    /// Number of base words with at least one override.
    pub fn base_count(&self) -> usize {
        self.sets.len()
    }

    pub fn reject(&mut self, base: &str, word: &str) -> Result<bool, OverrideError> {
        self.mutate(SetKind::Rejected, base, word, true)
    }

    pub fn unreject(&mut self, base: &str, word: &str) -> Result<bool, OverrideError> {
        self.mutate(SetKind::Rejected, base, word, false)
    }

    /// Adds a manual rhyme. Refuses empty, too-short, self-referential and
    /// duplicate words without touching any state.
    pub fn add_manual(&mut self, base: &str, word: &str) -> Result<bool, OverrideError> {
        let key = normalize(base);
        let word = normalize(word);
        if key.is_empty() {
            return Err(ManualRejection::MissingBase.into());
        }
        if word.is_empty() {
            return Err(ManualRejection::Empty.into());
        }
        if word == key {
            return Err(ManualRejection::SelfReference.into());
        }
        if word.chars().count() < self.min_manual_len {
            return Err(ManualRejection::TooShort {
                min: self.min_manual_len,
            }
            .into());
        }
        if self.is_manual(&key, &word) {
            return Err(ManualRejection::Duplicate.into());
        }
        self.mutate(SetKind::Manual, &key, &word, true)
    }

    pub fn remove_manual(&mut self, base: &str, word: &str) -> Result<bool, OverrideError> {
        self.mutate(SetKind::Manual, base, word, false)
    }

    pub fn tag_slant(&mut self, base: &str, word: &str) -> Result<bool, OverrideError> {
        self.mutate(SetKind::Slant, base, word, true)
    }

    pub fn untag_slant(&mut self, base: &str, word: &str) -> Result<bool, OverrideError> {
        self.mutate(SetKind::Slant, base, word, false)
    }

    /// Flips slant membership; returns the new membership.
    pub fn toggle_slant(&mut self, base: &str, word: &str) -> Result<bool, OverrideError> {
        let tagged = !self.is_slant(base, word);
        self.mutate(SetKind::Slant, base, word, tagged)?;
        Ok(tagged)
    }

    /// Drops every override for every base word.
    pub fn clear(&mut self) -> Result<bool, OverrideError> {
        if self.sets.is_empty() {
            return Ok(false);
        }
        self.sets.clear();
        self.persist()?;
        Ok(true)
    }

    fn mutate(
        &mut self,
        kind: SetKind,
        base: &str,
        word: &str,
        present: bool,
    ) -> Result<bool, OverrideError> {
        let base = normalize(base);
        let word = normalize(word);
        if base.is_empty() || word.is_empty() {
            return Ok(false);
        }
        let changed = if present {
            self.insert(kind, &base, word)
        } else {
            self.remove(kind, &base, &word)
        };
        if changed {
            self.persist()?;
        }
        Ok(changed)
    }

    fn insert(&mut self, kind: SetKind, base: &str, word: String) -> bool {
        let sets = self.sets.entry(base.to_string()).or_default();
        set_of(sets, kind).insert(word)
    }

    fn remove(&mut self, kind: SetKind, base: &str, word: &str) -> bool {
        let Some(sets) = self.sets.get_mut(base) else {
            return false;
        };
        let removed = set_of(sets, kind).remove(word);
        if sets.is_empty() {
            self.sets.remove(base);
        }
        removed
    }

    fn persist(&mut self) -> Result<(), PersistError> {
        let snapshot = self.snapshot();
        self.sink.persist(&snapshot).inspect_err(|e| {
            tracing::warn!(error = %e, "override snapshot was not persisted");
        })
    }
}

fn set_of(sets: &mut WordOverrides, kind: SetKind) -> &mut BTreeSet<String> {
    match kind {
        SetKind::Rejected => &mut sets.rejected,
        SetKind::Manual => &mut sets.manual,
        SetKind::Slant => &mut sets.slant,
    }
}
