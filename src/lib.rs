// src/lib.rs

pub mod config;
pub mod core;
pub mod error;
pub mod overrides;
pub mod persistence;
pub use crate::core::engine::RhymeEngine;
pub use crate::core::types::{Candidate, PhonemeEntry, SortMode, Tier};
