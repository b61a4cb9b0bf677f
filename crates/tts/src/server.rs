use std::sync::Arc;

use chunker::ChunkBudget;
use credentials::{CredentialRegistry, KeyValidator};
use narrator_config::Config;
use secrecy::SecretString;

use crate::{
    error::TtsError,
    generation::{Generation, GenerationStore},
    pipeline::{GenerationPipeline, VoiceSelection},
    provider::elevenlabs::ElevenLabsProvider,
    request::RequestContext,
    types::VoiceSettings,
};

/// Shared state of the proxy and generation routes
pub struct Server {
    provider: ElevenLabsProvider,
    registry: Arc<CredentialRegistry>,
    generations: GenerationStore,
    budget: ChunkBudget,
    default_model: String,
    default_voice_settings: VoiceSettings,
}

impl Server {
    pub fn new(config: &Config, registry: Arc<CredentialRegistry>) -> crate::Result<Self> {
        let budget = config
            .chunking
            .budget()
            .map_err(|e| TtsError::ConfigError(e.to_string()))?;

        Ok(Self {
            provider: ElevenLabsProvider::new(&config.elevenlabs)?,
            registry,
            generations: GenerationStore::new(&config.generation),
            budget,
            default_model: config.elevenlabs.default_model.clone(),
            default_voice_settings: config.elevenlabs.voice_settings.into(),
        })
    }

    pub const fn provider(&self) -> &ElevenLabsProvider {
        &self.provider
    }

    pub const fn generations(&self) -> &GenerationStore {
        &self.generations
    }

    pub const fn budget(&self) -> ChunkBudget {
        self.budget
    }

    /// Validator used by the admin pool endpoints
    pub fn key_validator(&self) -> Arc<dyn KeyValidator> {
        Arc::new(self.provider.clone())
    }

    /// Resolve the upstream key selected by the request headers
    pub async fn api_key(&self, context: &RequestContext) -> crate::Result<SecretString> {
        self.registry
            .resolve(&context.credentials)
            .await?
            .ok_or(TtsError::MissingApiKey)
    }

    /// Apply configured defaults to a caller's voice choice
    pub fn voice_selection(
        &self,
        voice_id: String,
        model_id: Option<String>,
        voice_settings: Option<VoiceSettings>,
    ) -> VoiceSelection {
        VoiceSelection {
            voice_id,
            model_id: model_id
                .filter(|model| !model.is_empty())
                .unwrap_or_else(|| self.default_model.clone()),
            voice_settings: voice_settings.unwrap_or_else(|| self.default_voice_settings.clone()),
        }
    }

    /// Chunk `text`, synthesize every chunk in order and keep the result
    pub async fn generate(
        &self,
        api_key: SecretString,
        voice: VoiceSelection,
        text: &str,
    ) -> Arc<Generation> {
        let chunks = chunker::split_into_chunks(text, self.budget);

        tracing::info!(
            parts = chunks.len(),
            voice = %voice.voice_id,
            model = %voice.model_id,
            "starting generation"
        );

        let outcome = GenerationPipeline::new(&self.provider, api_key, voice)
            .run(chunks)
            .await;

        self.generations.insert(Generation::new(outcome))
    }
}
