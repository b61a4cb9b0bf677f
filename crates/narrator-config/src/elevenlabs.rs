use std::time::Duration;

use serde::Deserialize;

/// Upstream ElevenLabs API settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElevenLabsConfig {
    /// API root, including the version segment
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model used when a request does not name one
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Voice settings used when a request does not carry any
    #[serde(default)]
    pub voice_settings: VoiceSettingsConfig,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ElevenLabsConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_model: default_model(),
            voice_settings: VoiceSettingsConfig::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Default `voice_settings` sent with synthesis requests
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoiceSettingsConfig {
    #[serde(default = "default_stability")]
    pub stability: f64,
    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f64,
}

impl Default for VoiceSettingsConfig {
    fn default() -> Self {
        Self {
            stability: default_stability(),
            similarity_boost: default_similarity_boost(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.elevenlabs.io/v1".to_string()
}

fn default_model() -> String {
    "eleven_monolingual_v1".to_string()
}

const fn default_timeout_secs() -> u64 {
    120
}

const fn default_stability() -> f64 {
    0.5
}

const fn default_similarity_boost() -> f64 {
    0.75
}
