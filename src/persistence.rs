// File: src/persistence.rs
use crate::core::usage::UsageCounts;
use crate::error::PersistError;
use crate::overrides::{OverrideSink, OverrideSnapshot};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Serializes `value` as JSON to `path` via a temp file in the same directory,
/// so a crash never leaves a half-written file behind.
pub fn write_json_atomic<T: Serialize>(value: &T, path: &Path) -> Result<(), PersistError> {
    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }

    temp_file.persist(path)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// Reads persisted overrides. A missing or corrupt file yields empty sets.
pub fn load_overrides(path: &Path) -> OverrideSnapshot {
    if !path.exists() {
        return OverrideSnapshot::default();
    }
    match read_json(path) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "override data unreadable, starting empty");
            OverrideSnapshot::default()
        }
    }
}

/// Reads persisted usage counts, empty on any failure.
pub fn load_usage(path: &Path) -> UsageCounts {
    if !path.exists() {
        return UsageCounts::new();
    }
    read_json(path).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "usage data unreadable, starting empty");
        UsageCounts::new()
    })
}

pub fn save_usage(usage: &UsageCounts, path: &Path) -> Result<(), PersistError> {
    write_json_atomic(usage, path)
}

/// Sink that rewrites one JSON file on every override mutation.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OverrideSink for JsonFileSink {
    fn persist(&mut self, snapshot: &OverrideSnapshot) -> Result<(), PersistError> {
        write_json_atomic(snapshot, &self.path)
    }
}
