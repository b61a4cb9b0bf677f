pub mod elevenlabs;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::types::{SpeechRequest, SpeechResponse};

/// Turns one piece of text into audio
#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// Synthesize text to speech
    async fn synthesize(&self, api_key: &SecretString, request: &SpeechRequest) -> crate::Result<SpeechResponse>;

    /// Get the provider name
    fn name(&self) -> &str;
}
