// File: src/config.rs
use crate::core::types::SortMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Tunable settings for one engine session, read from JSON.
/// Every field is optional in the file; missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Phoneme dataset: `.json`, `.bin` cache, or CMU dictionary text.
    pub phoneme_data_path: Option<PathBuf>,
    /// Where to write a bincode cache of the loaded dataset.
    pub phoneme_cache_path: Option<PathBuf>,
    pub overrides_path: Option<PathBuf>,
    pub usage_path: Option<PathBuf>,
    pub default_sort_mode: SortMode,
    /// Manual additions shorter than this are refused.
    pub min_manual_word_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            phoneme_data_path: None,
            phoneme_cache_path: None,
            overrides_path: None,
            usage_path: None,
            default_sort_mode: SortMode::Frequency,
            min_manual_word_len: 2,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads `path`, falling back to defaults if it is missing or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "no config file, using defaults");
                return Self::default();
            }
        };
        Self::from_json(&text).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "malformed config, using defaults");
            Self::default()
        })
    }
}
