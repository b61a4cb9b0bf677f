use axum::body::Bytes;
use narrator_config::VoiceSettingsConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `voice_settings` forwarded to ElevenLabs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub stability: f64,
    pub similarity_boost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_speaker_boost: Option<bool>,
}

impl From<VoiceSettingsConfig> for VoiceSettings {
    fn from(config: VoiceSettingsConfig) -> Self {
        Self {
            stability: config.stability,
            similarity_boost: config.similarity_boost,
            style: None,
            use_speaker_boost: None,
        }
    }
}

/// A single synthesis call, with defaults already applied
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    pub voice_id: String,
    pub text: String,
    pub model_id: String,
    pub voice_settings: VoiceSettings,
}

/// Raw audio returned by the provider
#[derive(Debug, Clone)]
pub struct SpeechResponse {
    pub audio: Bytes,
    /// Content type of the audio (e.g. "audio/mpeg")
    pub content_type: String,
}

impl SpeechResponse {
    /// Convert the speech response into an axum HTTP response
    pub fn into_response(self) -> axum::response::Response {
        use axum::response::IntoResponse;

        ([(http::header::CONTENT_TYPE, self.content_type)], self.audio).into_response()
    }

    /// Like [`Self::into_response`], served as an attachment named `filename`
    pub fn into_download(self, filename: &str) -> axum::response::Response {
        use axum::response::IntoResponse;

        (
            [
                (http::header::CONTENT_TYPE, self.content_type),
                (
                    http::header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            self.audio,
        )
            .into_response()
    }
}

/// Body of `POST /api/tts`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisPayload {
    pub voice_id: Option<String>,
    pub text: Option<String>,
    pub model_id: Option<String>,
    pub voice_settings: Option<VoiceSettings>,
}

/// Body of `POST /api/generate`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePayload {
    #[serde(default)]
    pub text: String,
    pub voice_id: Option<String>,
    pub model_id: Option<String>,
    pub voice_settings: Option<VoiceSettings>,
}

/// Body of `POST /api/chunks`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkPreviewPayload {
    #[serde(default)]
    pub text: String,
    pub min_chars: Option<usize>,
    pub max_chars: Option<usize>,
}

/// One audio sample of a voice clone request
#[derive(Debug, Deserialize)]
pub struct VoiceSample {
    /// Base64-encoded audio
    pub content: String,
}

/// Body of `POST /api/voices/clone`
#[derive(Debug, Deserialize)]
pub struct CloneVoicePayload {
    pub name: Option<String>,
    #[serde(default)]
    pub files: Vec<VoiceSample>,
    pub description: Option<String>,
    /// Either a JSON string or an object, sent upstream as a JSON string
    pub labels: Option<Value>,
}

/// Decoded voice clone request
#[derive(Debug)]
pub struct CloneVoice {
    pub name: String,
    pub samples: Vec<Vec<u8>>,
    pub description: Option<String>,
    pub labels: Option<String>,
}
