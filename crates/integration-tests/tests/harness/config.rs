//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::path::Path;

use narrator_config::{
    ChunkingConfig, Config, CorsConfig, CsrfConfig, ElevenLabsConfig, ServerConfig, SlotConfig, StoreConfig,
};
use secrecy::SecretString;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Minimal defaults with every slot empty
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    ..ServerConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// Point the upstream client at a mock server
    pub fn with_upstream(mut self, base_url: &str) -> Self {
        self.config.elevenlabs = ElevenLabsConfig {
            base_url: base_url.to_owned(),
            timeout_secs: 5,
            ..ElevenLabsConfig::default()
        };
        self
    }

    /// Configure the API key of slot `index`
    pub fn with_slot_key(mut self, index: usize, key: &str) -> Self {
        let slot: &mut SlotConfig = &mut self.config.credentials.slots[index];
        slot.api_key = Some(SecretString::from(key.to_owned()));
        self
    }

    /// Persist credentials to a JSON file
    pub fn with_file_store(mut self, path: &Path) -> Self {
        self.config.credentials.store = StoreConfig::File { path: path.to_path_buf() };
        self
    }

    /// Override the chunk budget
    pub fn with_budget(mut self, min_chars: usize, max_chars: usize) -> Self {
        self.config.chunking = ChunkingConfig { min_chars, max_chars };
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = Some(config);
        self
    }

    /// Set CSRF configuration
    pub fn with_csrf(mut self, config: CsrfConfig) -> Self {
        self.config.server.csrf = Some(config);
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
