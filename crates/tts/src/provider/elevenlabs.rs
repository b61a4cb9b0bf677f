use async_trait::async_trait;
use axum::body::Bytes;
use credentials::{AccountInfo, KeyRejection, KeyValidator};
use narrator_config::ElevenLabsConfig;
use reqwest::{Client, RequestBuilder, multipart};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use url::Url;

use crate::{
    error::TtsError,
    http_client::http_client,
    types::{CloneVoice, SpeechRequest, SpeechResponse, VoiceSettings},
};

use super::TtsProvider;

const API_KEY_HEADER: &str = "xi-api-key";

/// `ElevenLabs` API client
///
/// Keys are passed per call so one client serves every slot and pool key.
#[derive(Clone)]
pub struct ElevenLabsProvider {
    client: Client,
    base_url: Url,
}

impl ElevenLabsProvider {
    pub fn new(config: &ElevenLabsConfig) -> crate::Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| TtsError::ConfigError(format!("Invalid ElevenLabs base URL: {e}")))?;

        if base_url.cannot_be_a_base() {
            return Err(TtsError::ConfigError(format!(
                "ElevenLabs base URL cannot carry a path: {base_url}"
            )));
        }

        Ok(Self {
            client: http_client(config.timeout())?,
            base_url,
        })
    }

    /// Base URL extended with `segments`, each percent-encoded as one segment
    ///
    /// Caller-supplied ids go through here, so `/`, `?` and `#` can never
    /// change which endpoint is reached.
    fn url(&self, segments: &[&str]) -> crate::Result<Url> {
        if let Some(segment) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(TtsError::InvalidRequest(format!("Invalid path segment '{segment}'")));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| TtsError::ConfigError("ElevenLabs base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    /// `GET /user`
    pub async fn user(&self, api_key: &SecretString) -> crate::Result<Value> {
        self.get_json(api_key, &["user"], &[]).await
    }

    /// `GET /voices`
    pub async fn voices(&self, api_key: &SecretString) -> crate::Result<Value> {
        self.get_json(api_key, &["voices"], &[]).await
    }

    /// `GET /user/subscription`
    pub async fn subscription(&self, api_key: &SecretString) -> crate::Result<Value> {
        self.get_json(api_key, &["user", "subscription"], &[]).await
    }

    /// `GET /usage/character-stats` between two unix timestamps
    pub async fn character_stats(&self, api_key: &SecretString, start_unix: i64, end_unix: i64) -> crate::Result<Value> {
        let query = [("start_unix", start_unix.to_string()), ("end_unix", end_unix.to_string())];
        self.get_json(api_key, &["usage", "character-stats"], &query).await
    }

    /// `GET /history`
    pub async fn history(&self, api_key: &SecretString, page_size: u32) -> crate::Result<Value> {
        self.get_json(api_key, &["history"], &[("page_size", page_size.to_string())])
            .await
    }

    /// `GET /history/{id}/audio`
    pub async fn history_audio(&self, api_key: &SecretString, history_item_id: &str) -> crate::Result<SpeechResponse> {
        let request = self
            .client
            .get(self.url(&["history", history_item_id, "audio"])?)
            .header(API_KEY_HEADER, api_key.expose_secret());

        let response = send(request).await?;
        read_audio(response).await
    }

    /// `POST /voices/add` (instant voice cloning)
    pub async fn clone_voice(&self, api_key: &SecretString, voice: CloneVoice) -> crate::Result<Value> {
        tracing::debug!(samples = voice.samples.len(), "ElevenLabs voice clone request");

        let mut form = multipart::Form::new().text("name", voice.name);

        if let Some(description) = voice.description {
            form = form.text("description", description);
        }

        if let Some(labels) = voice.labels {
            form = form.text("labels", labels);
        }

        for sample in voice.samples {
            let part = multipart::Part::bytes(sample)
                .file_name("sample.mp3")
                .mime_str("audio/mpeg")
                .map_err(|e| TtsError::InternalError(Some(format!("Invalid sample content type: {e}"))))?;
            form = form.part("files", part);
        }

        let request = self
            .client
            .post(self.url(&["voices", "add"])?)
            .header(API_KEY_HEADER, api_key.expose_secret())
            .multipart(form);

        read_json(send(request).await?).await
    }

    async fn get_json(&self, api_key: &SecretString, path: &[&str], query: &[(&str, String)]) -> crate::Result<Value> {
        let request = self
            .client
            .get(self.url(path)?)
            .header(API_KEY_HEADER, api_key.expose_secret())
            .query(query);

        read_json(send(request).await?).await
    }
}

#[derive(serde::Serialize)]
struct ElevenLabsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: &'a VoiceSettings,
}

#[async_trait]
impl TtsProvider for ElevenLabsProvider {
    async fn synthesize(&self, api_key: &SecretString, request: &SpeechRequest) -> crate::Result<SpeechResponse> {
        tracing::debug!(
            "ElevenLabs TTS request: model={}, voice={}, input_len={}",
            request.model_id,
            request.voice_id,
            request.text.len(),
        );

        let body = ElevenLabsRequest {
            text: &request.text,
            model_id: &request.model_id,
            voice_settings: &request.voice_settings,
        };

        let http_request = self
            .client
            .post(self.url(&["text-to-speech", request.voice_id.as_str()])?)
            .header(API_KEY_HEADER, api_key.expose_secret())
            .json(&body);

        let response = read_audio(send(http_request).await?).await?;

        tracing::debug!("ElevenLabs TTS synthesis complete, {} bytes", response.audio.len());

        Ok(response)
    }

    fn name(&self) -> &'static str {
        "elevenlabs"
    }
}

#[async_trait]
impl KeyValidator for ElevenLabsProvider {
    async fn validate(&self, api_key: &SecretString) -> Result<AccountInfo, KeyRejection> {
        match self.user(api_key).await {
            Ok(user) => Ok(AccountInfo {
                email: user.get("email").and_then(Value::as_str).map(str::to_string),
            }),
            Err(TtsError::ProviderApiError { status, .. }) => {
                tracing::debug!("ElevenLabs rejected key during validation ({status})");
                Err(KeyRejection::Invalid)
            }
            Err(e) => Err(KeyRejection::Unreachable(e.to_string())),
        }
    }
}

/// Send a request, turning non-success statuses into `ProviderApiError`
async fn send(request: RequestBuilder) -> crate::Result<reqwest::Response> {
    let response = request.send().await.map_err(|e| {
        tracing::error!("ElevenLabs request failed: {e}");
        TtsError::ConnectionError(format!("Failed to send request to ElevenLabs: {e}"))
    })?;

    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

    tracing::warn!("ElevenLabs API error ({status}): {error_text}");

    Err(TtsError::from_upstream(status.as_u16(), &error_text))
}

async fn read_json(response: reqwest::Response) -> crate::Result<Value> {
    response.json().await.map_err(|e| {
        tracing::error!("Failed to decode ElevenLabs response: {e}");
        TtsError::InternalError(Some(format!("Invalid response from ElevenLabs: {e}")))
    })
}

async fn read_audio(response: reqwest::Response) -> crate::Result<SpeechResponse> {
    let content_type = response
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("audio/mpeg")
        .to_string();

    let audio: Bytes = response.bytes().await.map_err(|e| {
        tracing::error!("Failed to read ElevenLabs response body: {e}");
        TtsError::InternalError(None)
    })?;

    Ok(SpeechResponse { audio, content_type })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn provider(server: &MockServer) -> ElevenLabsProvider {
        let config = ElevenLabsConfig {
            base_url: format!("{}/v1/", server.uri()),
            ..ElevenLabsConfig::default()
        };
        ElevenLabsProvider::new(&config).unwrap()
    }

    fn key() -> SecretString {
        SecretString::from("sk_test".to_string())
    }

    fn speech(text: &str) -> SpeechRequest {
        SpeechRequest {
            voice_id: "voice_1".to_string(),
            text: text.to_string(),
            model_id: "eleven_monolingual_v1".to_string(),
            voice_settings: narrator_config::VoiceSettingsConfig::default().into(),
        }
    }

    #[tokio::test]
    async fn synthesize_sends_defaults_and_returns_audio() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/text-to-speech/voice_1"))
            .and(header("xi-api-key", "sk_test"))
            .and(body_json(json!({
                "text": "Hello world.",
                "model_id": "eleven_monolingual_v1",
                "voice_settings": { "stability": 0.5, "similarity_boost": 0.75 }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "audio/mpeg")
                    .set_body_bytes(b"ID3audio".to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let response = provider(&server).synthesize(&key(), &speech("Hello world.")).await.unwrap();

        assert_eq!(response.audio.as_ref(), b"ID3audio");
        assert_eq!(response.content_type, "audio/mpeg");
    }

    #[tokio::test]
    async fn upstream_errors_keep_status_and_body() {
        let server = MockServer::start().await;
        let detail = json!({ "detail": { "status": "quota_exceeded", "message": "No characters left" } });

        Mock::given(method("POST"))
            .and(path("/v1/text-to-speech/voice_1"))
            .respond_with(ResponseTemplate::new(429).set_body_json(detail.clone()))
            .mount(&server)
            .await;

        let err = provider(&server).synthesize(&key(), &speech("x")).await.unwrap_err();

        assert!(matches!(err, TtsError::ProviderApiError { status: 429, ref body } if *body == detail));
    }

    #[tokio::test]
    async fn voice_id_stays_inside_its_path_segment() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/text-to-speech/..%2Fuser%3Fx=1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"audio".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let mut request = speech("Hi.");
        request.voice_id = "../user?x=1".to_string();

        provider(&server).synthesize(&key(), &request).await.unwrap();
    }

    #[tokio::test]
    async fn history_id_is_encoded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/history/a%2Fb%23c/audio"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"audio".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let audio = provider(&server).history_audio(&key(), "a/b#c").await.unwrap();
        assert_eq!(audio.audio.as_ref(), b"audio");
    }

    #[tokio::test]
    async fn dot_segments_are_rejected_before_sending() {
        let server = MockServer::start().await;

        let mut request = speech("Hi.");
        request.voice_id = "..".to_string();

        let err = provider(&server).synthesize(&key(), &request).await.unwrap_err();
        assert!(matches!(err, TtsError::InvalidRequest(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let config = ElevenLabsConfig {
            base_url: "not a url".to_string(),
            ..ElevenLabsConfig::default()
        };
        assert!(matches!(ElevenLabsProvider::new(&config), Err(TtsError::ConfigError(_))));
    }

    #[tokio::test]
    async fn character_stats_passes_window() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/usage/character-stats"))
            .and(query_param("start_unix", "100"))
            .and(query_param("end_unix", "200"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "time": [], "usage": {} })))
            .expect(1)
            .mount(&server)
            .await;

        let stats = provider(&server).character_stats(&key(), 100, 200).await.unwrap();
        assert!(stats["time"].is_array());
    }

    #[tokio::test]
    async fn history_uses_page_size() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/history"))
            .and(query_param("page_size", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "history": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let history = provider(&server).history(&key(), 25).await.unwrap();
        assert_eq!(history, json!({ "history": [] }));
    }

    #[tokio::test]
    async fn clone_voice_posts_multipart() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/voices/add"))
            .and(header("xi-api-key", "sk_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "voice_id": "cloned" })))
            .expect(1)
            .mount(&server)
            .await;

        let voice = CloneVoice {
            name: "Narrator".to_string(),
            samples: vec![b"sample".to_vec()],
            description: Some("warm".to_string()),
            labels: Some(r#"{"accent":"american"}"#.to_string()),
        };

        let created = provider(&server).clone_voice(&key(), voice).await.unwrap();
        assert_eq!(created["voice_id"], "cloned");

        let requests = server.received_requests().await.unwrap();
        let content_type = requests[0].headers.get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data"));

        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("name=\"files\"; filename=\"sample.mp3\""));
        assert!(body.contains("Narrator"));
    }

    #[tokio::test]
    async fn validation_reads_email() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/user"))
            .and(header("xi-api-key", "sk_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "email": "reader@example.com" })))
            .mount(&server)
            .await;

        let account = provider(&server).validate(&key()).await.unwrap();
        assert_eq!(account.email.as_deref(), Some("reader@example.com"));
    }

    #[tokio::test]
    async fn validation_rejects_unauthorized_key() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": { "status": "invalid_api_key" } })))
            .mount(&server)
            .await;

        let rejection = provider(&server).validate(&key()).await.unwrap_err();
        assert!(matches!(rejection, KeyRejection::Invalid));
    }

    #[tokio::test]
    async fn validation_reports_unreachable_upstream() {
        let config = ElevenLabsConfig {
            base_url: "http://127.0.0.1:1/v1".to_string(),
            ..ElevenLabsConfig::default()
        };
        let provider = ElevenLabsProvider::new(&config).unwrap();

        let rejection = provider.validate(&key()).await.unwrap_err();
        assert!(matches!(rejection, KeyRejection::Unreachable(_)));
    }
}
