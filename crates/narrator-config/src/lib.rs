#![allow(clippy::must_use_candidate)]

pub mod chunking;
pub mod cors;
pub mod credentials;
pub mod csrf;
pub mod elevenlabs;
mod env;
pub mod generation;
pub mod health;
mod loader;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use chunking::*;
pub use cors::*;
pub use credentials::*;
pub use csrf::*;
pub use elevenlabs::*;
pub use generation::*;
pub use health::*;
pub use server::*;
pub use telemetry::TelemetryConfig;

/// Top-level Narrator configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream ElevenLabs API settings
    #[serde(default)]
    pub elevenlabs: ElevenLabsConfig,
    /// Chunk budget applied to generation requests
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Account slots and key store
    #[serde(default)]
    pub credentials: CredentialsConfig,
    /// Retention of finished generations
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
