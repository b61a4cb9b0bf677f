//! Mock ElevenLabs API for integration tests
//!
//! Serves a minimal `/v1` surface, records synthesis calls and can fail
//! one synthesis call with a configured status and body

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Prefix every key must carry to be accepted by `/v1/user`
pub const VALID_KEY_PREFIX: &str = "sk_";

/// One recorded text-to-speech call
#[derive(Debug, Clone)]
pub struct SynthesisCall {
    pub voice_id: String,
    pub api_key: String,
    pub body: Value,
}

/// Mock ElevenLabs backend
pub struct MockElevenLabs {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

#[derive(Default)]
struct MockState {
    calls: Mutex<Vec<SynthesisCall>>,
    /// 1-based synthesis call that fails, with its status and body
    failure: Option<(usize, StatusCode, Value)>,
}

impl MockElevenLabs {
    /// Start a mock that accepts every synthesis call
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(MockState::default()).await
    }

    /// Start a mock whose `call`-th synthesis request fails
    pub async fn start_failing_at(call: usize, status: u16, body: Value) -> anyhow::Result<Self> {
        let status = StatusCode::from_u16(status)?;
        Self::start_inner(MockState {
            failure: Some((call, status, body)),
            ..MockState::default()
        })
        .await
    }

    async fn start_inner(state: MockState) -> anyhow::Result<Self> {
        let state = Arc::new(state);

        let app = Router::new()
            .route("/v1/text-to-speech/{voice_id}", routing::post(handle_synthesis))
            .route("/v1/user", routing::get(handle_user))
            .route("/v1/voices", routing::get(handle_voices))
            .route("/v1/voices/add", routing::post(handle_voice_add))
            .route("/v1/user/subscription", routing::get(handle_subscription))
            .route("/v1/usage/character-stats", routing::get(handle_character_stats))
            .route("/v1/history", routing::get(handle_history))
            .route("/v1/history/{id}/audio", routing::get(handle_history_audio))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL including the `/v1` prefix
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Synthesis calls received so far, in order
    pub fn calls(&self) -> Vec<SynthesisCall> {
        self.state.calls.lock().unwrap().clone()
    }
}

impl Drop for MockElevenLabs {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Audio bytes returned for `text`
pub fn audio_for(text: &str) -> Vec<u8> {
    format!("MP3[{text}]").into_bytes()
}

fn api_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get("xi-api-key")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": { "status": "invalid_api_key", "message": "Invalid API key" } })),
    )
        .into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    api_key(headers).is_some_and(|key| key.starts_with(VALID_KEY_PREFIX))
}

async fn handle_synthesis(
    State(state): State<Arc<MockState>>,
    Path(voice_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let text = body["text"].as_str().unwrap_or_default().to_owned();

    let call_number = {
        let mut calls = state.calls.lock().unwrap();
        calls.push(SynthesisCall {
            voice_id,
            api_key: api_key(&headers).unwrap_or_default(),
            body,
        });
        calls.len()
    };

    if let Some((failing, status, ref error)) = state.failure
        && failing == call_number
    {
        return (status, Json(error.clone())).into_response();
    }

    ([("content-type", "audio/mpeg")], audio_for(&text)).into_response()
}

async fn handle_user(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "email": "reader@example.com", "subscription": { "tier": "creator" } })).into_response()
}

async fn handle_voices(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "voices": [{ "voice_id": "voice-1", "name": "Rachel" }] })).into_response()
}

async fn handle_voice_add(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "voice_id": "cloned-voice" })).into_response()
}

async fn handle_subscription(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "tier": "creator", "character_count": 1200, "character_limit": 100_000 })).into_response()
}

async fn handle_character_stats(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "time": [1, 2], "usage": { "All": [10, 20] } })).into_response()
}

async fn handle_history(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "history": [{ "history_item_id": "h1", "text": "Hello" }], "has_more": false })).into_response()
}

async fn handle_history_audio(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    ([("content-type", "audio/mpeg")], audio_for(&id)).into_response()
}
