use chunker::{ChunkBudget, ChunkError, DEFAULT_MAX_CHARS, DEFAULT_MIN_CHARS};
use serde::Deserialize;

/// Character window used when splitting scripts for synthesis
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChunkingConfig {
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl ChunkingConfig {
    pub const fn budget(&self) -> Result<ChunkBudget, ChunkError> {
        ChunkBudget::new(self.min_chars, self.max_chars)
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHARS,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

const fn default_min_chars() -> usize {
    DEFAULT_MIN_CHARS
}

const fn default_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}
