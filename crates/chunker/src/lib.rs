//! Sentence-safe text chunking
//!
//! Splits long scripts into chunks that fit a per-request character budget,
//! cutting at a full stop whenever one is close enough to the budget.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod budget;
mod split;
mod stats;

pub use budget::{ChunkBudget, ChunkError, DEFAULT_MAX_CHARS, DEFAULT_MIN_CHARS};
pub use split::{Chunks, Cut, CutStrategy, OVERFLOW_TOLERANCE};
pub use stats::{TextStats, WORDS_PER_MINUTE};

/// Split `text` into owned chunks using `budget`
pub fn split_into_chunks(text: &str, budget: ChunkBudget) -> Vec<String> {
    Chunks::new(text, budget).map(str::to_owned).collect()
}

/// Split `text` into owned chunks using the default 900/950 budget
pub fn chunk(text: &str) -> Vec<String> {
    split_into_chunks(text, ChunkBudget::default())
}
