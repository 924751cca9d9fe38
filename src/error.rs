// File: src/error.rs
use thiserror::Error;

/// Failure to materialize the phoneme dataset or another input file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed binary cache: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("dataset contains no usable entries")]
    Empty,
}

/// Failure to hand a snapshot to durable storage.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error while persisting: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not serialize snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not move temp file into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Why `add_manual` refused a word. No mutation happens in any of these cases.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManualRejection {
    #[error("no base word selected")]
    MissingBase,
    #[error("word is empty")]
    Empty,
    #[error("word is shorter than {min} characters")]
    TooShort { min: usize },
    #[error("a word cannot rhyme-list itself")]
    SelfReference,
    #[error("word is already in the manual list")]
    Duplicate,
}

/// Result of an override mutation that did not fully succeed.
#[derive(Debug, Error)]
pub enum OverrideError {
    /// The mutation was refused; in-memory state is unchanged.
    #[error("rejected: {0}")]
    Rejected(#[from] ManualRejection),
    /// The mutation was applied in memory but the sink failed to store it.
    #[error("applied but not persisted: {0}")]
    Persist(#[from] PersistError),
}
