//! Finished generations and their downloadable audio

use std::sync::Arc;

use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use mini_moka::sync::Cache;
use narrator_config::GenerationConfig;
use serde::Serialize;

use crate::{
    failure::FailureKind,
    pipeline::{AudioPart, GenerationOutcome, PartFailure},
    types::SpeechResponse,
};

/// A generation kept around for download
#[derive(Debug)]
pub struct Generation {
    pub id: String,
    pub total_parts: usize,
    pub parts: Vec<AudioPart>,
    pub failure: Option<PartFailure>,
}

impl Generation {
    pub fn new(outcome: GenerationOutcome) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            total_parts: outcome.total_parts,
            parts: outcome.parts,
            failure: outcome.failure,
        }
    }

    /// Audio of part `part_number` (1-based)
    pub fn part(&self, part_number: usize) -> Option<&SpeechResponse> {
        part_number
            .checked_sub(1)
            .and_then(|index| self.parts.get(index))
            .map(|part| &part.audio)
    }

    /// Every produced part joined in order
    pub fn concatenated(&self) -> Option<SpeechResponse> {
        let first = self.parts.first()?;

        let mut audio = Vec::with_capacity(self.parts.iter().map(|part| part.audio.audio.len()).sum());
        for part in &self.parts {
            audio.extend_from_slice(&part.audio.audio);
        }

        Some(SpeechResponse {
            audio: Bytes::from(audio),
            content_type: first.audio.content_type.clone(),
        })
    }

    pub fn report(&self) -> GenerationReport {
        let parts: Vec<PartReport> = self
            .parts
            .iter()
            .map(|part| PartReport {
                part_number: part.part_number,
                chars: part.text.encode_utf16().count(),
                bytes: part.audio.audio.len(),
                text: part.text.clone(),
            })
            .collect();

        GenerationReport {
            id: self.id.clone(),
            status: if self.failure.is_none() {
                GenerationStatus::Completed
            } else {
                GenerationStatus::Failed
            },
            total_parts: self.total_parts,
            characters_processed: parts.iter().map(|part| part.chars).sum(),
            parts,
            error: self.failure.as_ref().map(|failure| FailureReport {
                part_number: failure.part_number,
                kind: failure.failure.kind,
                message: failure.failure.message.clone(),
            }),
        }
    }

    /// Status the report should be served with
    pub fn status_code(&self) -> StatusCode {
        self.failure
            .as_ref()
            .map_or(StatusCode::OK, |failure| failure.failure.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Completed,
    Failed,
}

/// JSON summary of a generation
#[derive(Debug, Serialize)]
pub struct GenerationReport {
    pub id: String,
    pub status: GenerationStatus,
    pub total_parts: usize,
    pub parts: Vec<PartReport>,
    pub characters_processed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureReport>,
}

#[derive(Debug, Serialize)]
pub struct PartReport {
    pub part_number: usize,
    pub chars: usize,
    pub bytes: usize,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct FailureReport {
    pub part_number: usize,
    pub kind: FailureKind,
    pub message: String,
}

/// Report served with the generation's status code
pub struct ReportResponse(pub Arc<Generation>);

impl IntoResponse for ReportResponse {
    fn into_response(self) -> Response {
        (self.0.status_code(), Json(self.0.report())).into_response()
    }
}

/// In-memory TTL cache of finished generations
#[derive(Clone)]
pub struct GenerationStore {
    generations: Cache<String, Arc<Generation>>,
}

impl GenerationStore {
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            generations: Cache::builder()
                .max_capacity(config.capacity)
                .time_to_live(config.ttl())
                .build(),
        }
    }

    pub fn insert(&self, generation: Generation) -> Arc<Generation> {
        let generation = Arc::new(generation);
        self.generations.insert(generation.id.clone(), Arc::clone(&generation));
        generation
    }

    pub fn get(&self, id: &str) -> Option<Arc<Generation>> {
        self.generations.get(&id.to_string())
    }
}
