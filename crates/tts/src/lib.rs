#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod failure;
mod generation;
mod handlers;
mod http_client;
mod pipeline;
mod provider;
mod request;
mod server;
mod types;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use credentials::CredentialRegistry;

pub use error::{Result, TtsError};
pub use failure::{FailureKind, UpstreamFailure};
pub use generation::{Generation, GenerationReport, GenerationStatus, GenerationStore};
pub use pipeline::{AudioPart, GenerationOutcome, GenerationPipeline, PartFailure, VoiceSelection};
pub use provider::{TtsProvider, elevenlabs::ElevenLabsProvider};
pub use request::RequestContext;
pub use server::Server;
pub use types::{SpeechRequest, SpeechResponse, VoiceSettings};

/// Build the TTS server from configuration
pub fn build_server(config: &narrator_config::Config, registry: Arc<CredentialRegistry>) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        Server::new(config, registry).map_err(|e| anyhow::anyhow!("Failed to initialize TTS server: {e}"))?,
    );
    Ok(server)
}

/// Create the endpoint router for the proxy and generation routes
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new()
        .route("/api/tts", post(handlers::synthesize))
        .route("/api/user", get(handlers::user))
        .route("/api/voices", get(handlers::voices))
        .route("/api/voices/clone", post(handlers::clone_voice))
        .route("/api/subscription", get(handlers::subscription))
        .route("/api/usage", get(handlers::usage))
        .route("/api/history", get(handlers::history))
        .route("/api/history/{id}/audio", get(handlers::history_audio))
        .route("/api/chunks", post(handlers::preview_chunks))
        .route("/api/generate", post(handlers::generate))
        .route("/api/generations/{id}", get(handlers::generation_report))
        .route("/api/generations/{id}/parts/{part}", get(handlers::generation_part))
        .route("/api/generations/{id}/audio", get(handlers::generation_audio))
}
