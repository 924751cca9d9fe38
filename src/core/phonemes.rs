// --- File: src/core/phonemes.rs
use crate::core::types::{normalize, PhonemeEntry};
use crate::error::LoadError;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tempfile::NamedTempFile;

/// True for ARPAbet vowel codes (AA, AE1, IY0, ...).
pub fn is_vowel(code: &str) -> bool {
    matches!(code.as_bytes().first(), Some(b'A' | b'E' | b'I' | b'O' | b'U'))
}

/// Strips a single trailing stress digit, if present.
pub fn strip_stress(code: &str) -> &str {
    code.strip_suffix(['0', '1', '2']).unwrap_or(code)
}

/// The trailing stress digit of a code, if it has one.
pub fn stress_of(code: &str) -> Option<u8> {
    match code.as_bytes().last() {
        Some(&d @ (b'0' | b'1' | b'2')) => Some(d - b'0'),
        _ => None,
    }
}

/// Vowel codes in order with stress removed.
pub fn derive_rhyme_pattern(phonemes: &[String]) -> Vec<String> {
    phonemes
        .iter()
        .filter(|p| is_vowel(p))
        .map(|p| strip_stress(p).to_string())
        .collect()
}

/// Counts stress-marked codes; never less than one.
pub fn count_syllables(phonemes: &[String]) -> u32 {
    let stressed = phonemes.iter().filter(|p| stress_of(p).is_some()).count();
    (stressed as u32).max(1)
}

/// One record of the JSON dataset. Pattern and syllables are optional and
/// derived from the phonemes when absent.
#[derive(Deserialize)]
struct RawEntry {
    phonemes: Vec<String>,
    #[serde(default)]
    syllables: Option<u32>,
    #[serde(default, alias = "rhymePattern")]
    rhyme_pattern: Option<Vec<String>>,
}

/// The dataset object as `(word, record)` pairs in file order. Duplicate
/// keys are all kept so the store can apply first-wins after lowercasing.
struct RawDataset(Vec<(String, RawEntry)>);

impl<'de> Deserialize<'de> for RawDataset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DatasetVisitor;

        impl<'de> Visitor<'de> for DatasetVisitor {
            type Value = RawDataset;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping words to phoneme records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawDataset, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(pair) = map.next_entry::<String, RawEntry>()? {
                    entries.push(pair);
                }
                Ok(RawDataset(entries))
            }
        }

        deserializer.deserialize_map(DatasetVisitor)
    }
}

/// Read-only lookup from lowercase word to its phonetic data.
/// Built once by a loader; the engine never mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhonemeStore {
    entries: HashMap<String, PhonemeEntry>,
}

impl PhonemeStore {
    /// Builds a store from already-materialized entries. Keys are lowercased;
    /// the first entry for a given key wins.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = PhonemeEntry>,
    {
        let mut store = Self::default();
        for mut entry in entries {
            let key = normalize(&entry.word);
            if key.is_empty() || entry.phonemes.is_empty() {
                continue;
            }
            entry.word = key.clone();
            store.entries.entry(key).or_insert(entry);
        }
        store
    }

    /// Parses the JSON dataset: an object mapping word to
    /// `{"phonemes": [...], "syllables": n, "rhyme_pattern": [...]}`.
    /// Keys that collide after lowercasing keep the one written first.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let RawDataset(raw) = serde_json::from_str(json)?;
        let total = raw.len();
        let store = Self::from_entries(raw.into_iter().filter_map(|(word, raw)| {
            let rhyme_pattern = match raw.rhyme_pattern {
                Some(p) if !p.is_empty() => p.iter().map(|v| strip_stress(v).to_string()).collect(),
                _ => derive_rhyme_pattern(&raw.phonemes),
            };
            if rhyme_pattern.is_empty() {
                return None;
            }
            let syllables = raw
                .syllables
                .filter(|&s| s >= 1)
                .unwrap_or_else(|| count_syllables(&raw.phonemes));
            Some(PhonemeEntry {
                word,
                phonemes: raw.phonemes,
                syllables,
                rhyme_pattern,
            })
        }));
        if store.is_empty() {
            return Err(LoadError::Empty);
        }
        let skipped = total - store.len();
        if skipped > 0 {
            tracing::info!(skipped, "phoneme dataset entries without usable data were dropped");
        }
        Ok(store)
    }

    /// Parses CMU Pronouncing Dictionary text (`WORD  PH1 PH2 ...` per line).
    /// Comment lines start with `;;;`; alternate pronunciations such as
    /// `WORD(2)` are ignored so each word keeps its first pronunciation.
    pub fn from_cmudict(text: &str) -> Result<Self, LoadError> {
        let entries = text.lines().filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with(";;;") {
                return None;
            }
            let mut parts = line.split_whitespace();
            let word = parts.next()?;
            if word.ends_with(')') {
                return None;
            }
            let phonemes: Vec<String> = parts.map(str::to_string).collect();
            let rhyme_pattern = derive_rhyme_pattern(&phonemes);
            if rhyme_pattern.is_empty() {
                return None;
            }
            Some(PhonemeEntry {
                word: word.to_string(),
                syllables: count_syllables(&phonemes),
                phonemes,
                rhyme_pattern,
            })
        });
        let store = Self::from_entries(entries);
        if store.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(store)
    }

    /// Loads a dataset file, choosing the parser by extension: `.json` for
    /// the JSON dataset, `.bin` for a binary cache, anything else as CMU text.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let io_err = |source| LoadError::Io {
            path: path.display().to_string(),
            source,
        };
        let store = match path.extension().and_then(|e| e.to_str()) {
            Some("bin") => Self::load_binary(path)?,
            Some("json") => Self::from_json(&fs::read_to_string(path).map_err(io_err)?)?,
            _ => Self::from_cmudict(&fs::read_to_string(path).map_err(io_err)?)?,
        };
        tracing::info!(words = store.len(), path = %path.display(), "phoneme store loaded");
        Ok(store)
    }

    /// Writes the store as a bincode cache, atomically.
    pub fn save_binary(&self, path: &Path) -> Result<(), std::io::Error> {
        let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent_dir)?;

        let temp_file = NamedTempFile::new_in(parent_dir)?;
        let writer = BufWriter::new(&temp_file);
        bincode::serialize_into(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

        temp_file.persist(path)?;
        Ok(())
    }

    pub fn load_binary(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let store: PhonemeStore = bincode::deserialize_from(BufReader::new(file))?;
        if store.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(store)
    }

    /// Case-insensitive lookup.
    pub fn get(&self, word: &str) -> Option<&PhonemeEntry> {
        self.entries.get(&normalize(word))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.get(word).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Words in the store, in no particular order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn vowel_and_stress_helpers() {
        assert!(is_vowel("AE1"));
        assert!(is_vowel("UW"));
        assert!(!is_vowel("K"));
        assert!(!is_vowel(""));
        assert_eq!(strip_stress("AE1"), "AE");
        assert_eq!(strip_stress("T"), "T");
        assert_eq!(stress_of("IY0"), Some(0));
        assert_eq!(stress_of("EY2"), Some(2));
        assert_eq!(stress_of("S"), None);
    }

    #[test]
    fn derives_pattern_and_syllables() {
        let phonemes = codes("IH0 G Z AE1 M P AH0 L");
        assert_eq!(derive_rhyme_pattern(&phonemes), codes("IH AE AH"));
        assert_eq!(count_syllables(&phonemes), 3);
        assert_eq!(count_syllables(&codes("HH M")), 1);
    }

    #[test]
    fn json_dataset_lowercases_keys_and_fills_gaps() {
        let json = r#"{
            "Cat": {"phonemes": ["K", "AE1", "T"], "syllables": 1, "rhyme_pattern": ["AE"]},
            "pizza": {"phonemes": ["P", "IY1", "T", "S", "AH0"]},
            "bat": {"phonemes": ["B", "AE1", "T"], "rhymePattern": ["AE"]}
        }"#;
        let store = PhonemeStore::from_json(json).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get("CAT").unwrap().word, "cat");
        let pizza = store.get("pizza").unwrap();
        assert_eq!(pizza.rhyme_pattern, codes("IY AH"));
        assert_eq!(pizza.syllables, 2);
        assert_eq!(store.get("bat").unwrap().pattern_key(), "AE");
    }

    #[test]
    fn json_dataset_first_spelling_wins() {
        let upper_first = r#"{
            "Cat": {"phonemes": ["K", "AH1", "T"]},
            "cat": {"phonemes": ["K", "AE1", "T"]}
        }"#;
        let store = PhonemeStore::from_json(upper_first).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("cat").unwrap().rhyme_pattern, codes("AH"));

        let lower_first = r#"{
            "cat": {"phonemes": ["K", "AE1", "T"]},
            "Cat": {"phonemes": ["K", "AH1", "T"]}
        }"#;
        let store = PhonemeStore::from_json(lower_first).unwrap();
        assert_eq!(store.get("cat").unwrap().rhyme_pattern, codes("AE"));

        let repeated = r#"{
            "cat": {"phonemes": ["K", "AE1", "T"]},
            "cat": {"phonemes": ["K", "IH1", "T"]}
        }"#;
        let store = PhonemeStore::from_json(repeated).unwrap();
        assert_eq!(store.get("cat").unwrap().phonemes, codes("K AE1 T"));
    }

    #[test]
    fn json_dataset_without_usable_entries_is_an_error() {
        let json = r#"{"hmm": {"phonemes": ["HH", "M"]}}"#;
        assert!(matches!(PhonemeStore::from_json(json), Err(LoadError::Empty)));
        assert!(matches!(PhonemeStore::from_json("not json"), Err(LoadError::Json(_))));
    }

    #[test]
    fn cmudict_keeps_first_pronunciation() {
        let text = ";;; comment\nCAT  K AE1 T\nREAD  R IY1 D\nREAD(2)  R EH1 D\n";
        let store = PhonemeStore::from_cmudict(text).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("read").unwrap().rhyme_pattern, codes("IY"));
    }

    #[test]
    fn binary_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("phonemes.bin");
        let store = PhonemeStore::from_cmudict("CAT  K AE1 T\nBAT  B AE1 T\n").unwrap();
        store.save_binary(&path).unwrap();

        let loaded = PhonemeStore::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("bat"), store.get("bat"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = PhonemeStore::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
