//! Sequential, fail-fast synthesis of a chunked script

use secrecy::SecretString;

use crate::{
    failure::UpstreamFailure,
    provider::TtsProvider,
    types::{SpeechRequest, SpeechResponse, VoiceSettings},
};

/// Voice and model applied to every chunk of a generation
#[derive(Debug, Clone)]
pub struct VoiceSelection {
    pub voice_id: String,
    pub model_id: String,
    pub voice_settings: VoiceSettings,
}

/// Audio produced for one chunk
#[derive(Debug, Clone)]
pub struct AudioPart {
    /// 1-based position in the script
    pub part_number: usize,
    pub text: String,
    pub audio: SpeechResponse,
}

/// The chunk that stopped a generation
#[derive(Debug, Clone)]
pub struct PartFailure {
    pub part_number: usize,
    pub failure: UpstreamFailure,
}

/// Result of running the pipeline over a script
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub total_parts: usize,
    /// Parts produced before the first failure, in order
    pub parts: Vec<AudioPart>,
    pub failure: Option<PartFailure>,
}

impl GenerationOutcome {
    pub const fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Synthesizes chunks one at a time, stopping at the first failure
///
/// Each call is awaited before the next begins. Nothing is retried.
pub struct GenerationPipeline<'a> {
    provider: &'a dyn TtsProvider,
    api_key: SecretString,
    voice: VoiceSelection,
}

impl<'a> GenerationPipeline<'a> {
    pub const fn new(provider: &'a dyn TtsProvider, api_key: SecretString, voice: VoiceSelection) -> Self {
        Self {
            provider,
            api_key,
            voice,
        }
    }

    pub async fn run(&self, chunks: Vec<String>) -> GenerationOutcome {
        let total_parts = chunks.len();
        let mut parts = Vec::with_capacity(total_parts);

        for (index, text) in chunks.into_iter().enumerate() {
            let part_number = index + 1;

            tracing::debug!(part_number, total_parts, chars = text.encode_utf16().count(), "synthesizing part");

            let request = SpeechRequest {
                voice_id: self.voice.voice_id.clone(),
                text,
                model_id: self.voice.model_id.clone(),
                voice_settings: self.voice.voice_settings.clone(),
            };

            match self.provider.synthesize(&self.api_key, &request).await {
                Ok(audio) => parts.push(AudioPart {
                    part_number,
                    text: request.text,
                    audio,
                }),
                Err(error) => {
                    let failure = UpstreamFailure::from_error(&error);

                    tracing::warn!(part_number, total_parts, kind = ?failure.kind, "generation stopped: {}", failure.message);

                    return GenerationOutcome {
                        total_parts,
                        parts,
                        failure: Some(PartFailure { part_number, failure }),
                    };
                }
            }
        }

        tracing::debug!(total_parts, "generation complete");

        GenerationOutcome {
            total_parts,
            parts,
            failure: None,
        }
    }
}
