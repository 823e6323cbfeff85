// Sequence index and matching for the greedy diff encoder.
//
// This module provides:
// - Fixed-length sequence windows and their hash
// - A bucketed sequence-to-offset index with an optional per-bucket cap
// - Best-match selection and the greedy instruction walk

pub mod config;
pub mod matching;
pub mod sequence;
pub mod table;
