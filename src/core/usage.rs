// File: src/core/usage.rs
use crate::core::types::normalize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Historical usage counts used by the frequency sort.
pub trait FrequencySource {
    fn count(&self, word: &str) -> u64;
}

impl FrequencySource for HashMap<String, u64> {
    fn count(&self, word: &str) -> u64 {
        self.get(word).copied().unwrap_or(0)
    }
}

/// How often the user has actually used each word in a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageCounts {
    counts: HashMap<String, u64>,
    #[serde(default = "default_increment")]
    increment: u64,
}

fn default_increment() -> u64 {
    1
}

impl UsageCounts {
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
            increment: default_increment(),
        }
    }

    /// Records one use of `word`. O(1) amortized.
    pub fn record(&mut self, word: &str) -> u64 {
        let word = normalize(word);
        if word.is_empty() {
            return 0;
        }
        let count = self.counts.entry(word).or_insert(0);
        *count += self.increment.max(1);
        *count
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FrequencySource for UsageCounts {
    fn count(&self, word: &str) -> u64 {
        self.counts.get(&normalize(word)).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_case_insensitively() {
        let mut usage = UsageCounts::new();
        usage.record("Bat");
        assert_eq!(usage.record("bat"), 2);
        assert_eq!(usage.count("BAT"), 2);
        assert_eq!(usage.count("hat"), 0);
        assert_eq!(usage.record("   "), 0);
        assert_eq!(usage.len(), 1);
    }

    #[test]
    fn deserializes_without_increment() {
        let usage: UsageCounts = serde_json::from_str(r#"{"counts": {"bat": 3}}"#).unwrap();
        assert_eq!(usage.count("bat"), 3);
        let mut usage = usage;
        assert_eq!(usage.record("bat"), 4);
    }
}
