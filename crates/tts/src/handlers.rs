use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    response::Response,
};
use base64::Engine as _;
use chunker::{ChunkBudget, TextStats};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Result,
    error::TtsError,
    generation::ReportResponse,
    provider::TtsProvider as _,
    request::{ExtractPayload, RequestContext},
    server::Server,
    types::{ChunkPreviewPayload, CloneVoice, CloneVoicePayload, GeneratePayload, SpeechRequest, SynthesisPayload},
};

const DEFAULT_USAGE_DAYS: u32 = 31;
const DEFAULT_HISTORY_PAGE_SIZE: u32 = 100;
const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

fn query<T>(query: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| TtsError::InvalidRequest(rejection.body_text()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

/// `POST /api/tts`
pub async fn synthesize(
    State(server): State<Arc<Server>>,
    ExtractPayload(context, payload): ExtractPayload<SynthesisPayload>,
) -> Result<Response> {
    let api_key = server.api_key(&context).await?;

    let (Some(voice_id), Some(text)) = (non_empty(payload.voice_id), non_empty(payload.text)) else {
        return Err(TtsError::InvalidRequest("Missing voiceId or text".to_string()));
    };

    let voice = server.voice_selection(voice_id, payload.model_id, payload.voice_settings);

    let request = SpeechRequest {
        voice_id: voice.voice_id,
        text,
        model_id: voice.model_id,
        voice_settings: voice.voice_settings,
    };

    let response = server.provider().synthesize(&api_key, &request).await?;

    Ok(response.into_response())
}

/// `GET /api/user`
pub async fn user(State(server): State<Arc<Server>>, context: RequestContext) -> Result<Json<Value>> {
    let api_key = server.api_key(&context).await?;
    Ok(Json(server.provider().user(&api_key).await?))
}

/// `GET /api/voices`
pub async fn voices(State(server): State<Arc<Server>>, context: RequestContext) -> Result<Json<Value>> {
    let api_key = server.api_key(&context).await?;
    Ok(Json(server.provider().voices(&api_key).await?))
}

/// `GET /api/subscription`, with `remaining_characters` added
pub async fn subscription(State(server): State<Arc<Server>>, context: RequestContext) -> Result<Json<Value>> {
    let api_key = server.api_key(&context).await?;
    let mut subscription = server.provider().subscription(&api_key).await?;

    let count = subscription.get("character_count").and_then(Value::as_i64);
    let limit = subscription.get("character_limit").and_then(Value::as_i64);

    if let (Some(count), Some(limit), Some(fields)) = (count, limit, subscription.as_object_mut()) {
        fields.insert("remaining_characters".to_string(), Value::from(limit - count));
    }

    Ok(Json(subscription))
}

#[derive(Deserialize)]
pub struct UsageQuery {
    days: Option<u32>,
}

/// `GET /api/usage?days=31`
///
/// Upstream failures are reshaped to `{ error, details }`.
pub async fn usage(
    State(server): State<Arc<Server>>,
    context: RequestContext,
    params: std::result::Result<Query<UsageQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let api_key = server.api_key(&context).await?;
    let days = query(params)?.days.unwrap_or(DEFAULT_USAGE_DAYS);

    let end_unix = jiff::Timestamp::now().as_second();
    let start_unix = end_unix - i64::from(days) * SECONDS_PER_DAY;

    match server.provider().character_stats(&api_key, start_unix, end_unix).await {
        Ok(stats) => Ok(Json(stats)),
        Err(TtsError::ProviderApiError { status, body }) => {
            let message = body
                .pointer("/detail/message")
                .or_else(|| body.get("error"))
                .cloned()
                .unwrap_or_else(|| Value::String(body.to_string()));

            Err(TtsError::ProviderApiError {
                status,
                body: serde_json::json!({ "error": message, "details": body }),
            })
        }
        Err(e) => Err(e),
    }
}

/// `POST /api/voices/clone`
pub async fn clone_voice(
    State(server): State<Arc<Server>>,
    ExtractPayload(context, payload): ExtractPayload<CloneVoicePayload>,
) -> Result<Json<Value>> {
    let api_key = server.api_key(&context).await?;

    let Some(name) = non_empty(payload.name).filter(|_| !payload.files.is_empty()) else {
        return Err(TtsError::InvalidRequest("Missing name or audio files".to_string()));
    };

    let samples = payload
        .files
        .iter()
        .map(|file| base64::engine::general_purpose::STANDARD.decode(file.content.trim()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| TtsError::InvalidRequest(format!("Invalid base64 audio sample: {e}")))?;

    let labels = payload.labels.map(|labels| match labels {
        Value::String(labels) => labels,
        other => other.to_string(),
    });

    let voice = CloneVoice {
        name,
        samples,
        description: non_empty(payload.description),
        labels,
    };

    Ok(Json(server.provider().clone_voice(&api_key, voice).await?))
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    page_size: Option<u32>,
}

/// `GET /api/history?page_size=100`
pub async fn history(
    State(server): State<Arc<Server>>,
    context: RequestContext,
    params: std::result::Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let api_key = server.api_key(&context).await?;
    let page_size = query(params)?.page_size.unwrap_or(DEFAULT_HISTORY_PAGE_SIZE);

    Ok(Json(server.provider().history(&api_key, page_size).await?))
}

/// `GET /api/history/{id}/audio`
pub async fn history_audio(
    State(server): State<Arc<Server>>,
    context: RequestContext,
    Path(id): Path<String>,
) -> Result<Response> {
    let api_key = server.api_key(&context).await?;
    let audio = server.provider().history_audio(&api_key, &id).await?;

    Ok(audio.into_response())
}

#[derive(Serialize)]
pub struct ChunkPreview {
    chunks: Vec<String>,
    stats: StatsView,
}

#[derive(Serialize)]
struct StatsView {
    chars: usize,
    words: usize,
    estimated_minutes: f64,
    parts: usize,
}

/// `POST /api/chunks`
pub async fn preview_chunks(
    State(server): State<Arc<Server>>,
    ExtractPayload(_, payload): ExtractPayload<ChunkPreviewPayload>,
) -> Result<Json<ChunkPreview>> {
    let defaults = server.budget();

    let budget = ChunkBudget::new(
        payload.min_chars.unwrap_or_else(|| defaults.min_chars()),
        payload.max_chars.unwrap_or_else(|| defaults.max_chars()),
    )
    .map_err(|e| TtsError::InvalidRequest(e.to_string()))?;

    let chunks = chunker::split_into_chunks(&payload.text, budget);
    let stats = TextStats::estimate(&payload.text);

    Ok(Json(ChunkPreview {
        stats: StatsView {
            chars: stats.chars,
            words: stats.words,
            estimated_minutes: stats.estimated_minutes,
            parts: chunks.len(),
        },
        chunks,
    }))
}

/// `POST /api/generate`
pub async fn generate(
    State(server): State<Arc<Server>>,
    ExtractPayload(context, payload): ExtractPayload<GeneratePayload>,
) -> Result<ReportResponse> {
    if payload.text.trim().is_empty() {
        return Err(TtsError::InvalidRequest("No text entered".to_string()));
    }

    let Some(voice_id) = non_empty(payload.voice_id) else {
        return Err(TtsError::InvalidRequest("Missing voiceId".to_string()));
    };

    let api_key = server.api_key(&context).await?;
    let voice = server.voice_selection(voice_id, payload.model_id, payload.voice_settings);

    let generation = server.generate(api_key, voice, &payload.text).await;

    Ok(ReportResponse(generation))
}

/// `GET /api/generations/{id}`
pub async fn generation_report(
    State(server): State<Arc<Server>>,
    Path(id): Path<String>,
) -> Result<ReportResponse> {
    server
        .generations()
        .get(&id)
        .map(ReportResponse)
        .ok_or_else(|| TtsError::NotFound("Generation".to_string()))
}

/// `GET /api/generations/{id}/parts/{part}`
pub async fn generation_part(
    State(server): State<Arc<Server>>,
    Path((id, part)): Path<(String, usize)>,
) -> Result<Response> {
    let generation = server
        .generations()
        .get(&id)
        .ok_or_else(|| TtsError::NotFound("Generation".to_string()))?;

    let audio = generation
        .part(part)
        .cloned()
        .ok_or_else(|| TtsError::NotFound("Part".to_string()))?;

    Ok(audio.into_download(&format!("part_{part}.mp3")))
}

/// `GET /api/generations/{id}/audio`
pub async fn generation_audio(
    State(server): State<Arc<Server>>,
    Path(id): Path<String>,
) -> Result<Response> {
    let audio = server
        .generations()
        .get(&id)
        .and_then(|generation| generation.concatenated())
        .ok_or_else(|| TtsError::NotFound("Generation audio".to_string()))?;

    Ok(audio.into_download("full_audio.mp3"))
}
