// src/core/mod.rs
pub mod candidates;
pub mod engine;
pub mod phonemes;
pub mod scorer;
pub mod sort;
pub mod stress;
pub mod tier;
pub mod types;
pub mod usage;
