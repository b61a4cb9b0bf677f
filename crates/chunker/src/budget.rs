use thiserror::Error;

/// Default lower bound of the preferred cut window
pub const DEFAULT_MIN_CHARS: usize = 900;

/// Default upper bound of the preferred cut window
pub const DEFAULT_MAX_CHARS: usize = 950;

/// Errors raised when a chunk budget violates its preconditions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// Either bound is zero, or `min_chars > max_chars`
    #[error("invalid chunk budget: min_chars ({min_chars}) and max_chars ({max_chars}) must satisfy 0 < min <= max")]
    InvalidBudget { min_chars: usize, max_chars: usize },
}

/// Character window that governs where chunks are cut
///
/// Lengths are counted in UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBudget {
    min_chars: usize,
    max_chars: usize,
}

impl ChunkBudget {
    /// Create a budget, rejecting zero bounds and inverted windows
    pub const fn new(min_chars: usize, max_chars: usize) -> Result<Self, ChunkError> {
        if min_chars == 0 || max_chars == 0 || min_chars > max_chars {
            return Err(ChunkError::InvalidBudget { min_chars, max_chars });
        }

        Ok(Self { min_chars, max_chars })
    }

    pub const fn min_chars(&self) -> usize {
        self.min_chars
    }

    pub const fn max_chars(&self) -> usize {
        self.max_chars
    }
}

impl Default for ChunkBudget {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHARS,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}
