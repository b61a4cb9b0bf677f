use std::time::Duration;

use serde::Deserialize;

/// How long finished generations stay downloadable
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Seconds a generation is kept after it finishes
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Maximum number of generations held in memory
    #[serde(default = "default_capacity")]
    pub capacity: u64,
}

impl GenerationConfig {
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            capacity: default_capacity(),
        }
    }
}

const fn default_ttl_secs() -> u64 {
    60 * 60
}

const fn default_capacity() -> u64 {
    64
}
