use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use credentials::CredentialError;
use narrator_core::{ErrorBody, HttpError};
use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TtsError>;

/// Proxy and generation errors
#[derive(Debug, Error)]
pub enum TtsError {
    /// Invalid request parameters
    #[error("{0}")]
    InvalidRequest(String),

    /// Request body is not JSON
    #[error("Unsupported Content-Type, expected: 'Content-Type: application/json'")]
    UnsupportedMediaType,

    /// Request body exceeds the configured limit
    #[error("Request body is too large")]
    PayloadTooLarge,

    /// The selected credential resolved to no key
    #[error("Server configuration error: Missing API Key")]
    MissingApiKey,

    /// Unknown generation or part
    #[error("{0} not found")]
    NotFound(String),

    /// Upstream answered with a non-success status
    ///
    /// `body` is forwarded to the client unchanged.
    #[error("Provider API error ({status})")]
    ProviderApiError { status: u16, body: Value },

    /// Network or connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal server error
    /// If Some(message), it can be shown to the caller
    /// If None, details must not leak
    #[error("Internal server error")]
    InternalError(Option<String>),

    /// Credential lookup failed
    #[error(transparent)]
    Credentials(#[from] CredentialError),
}

impl TtsError {
    /// Build a provider error from a raw upstream body
    ///
    /// JSON bodies are kept as-is; anything else is wrapped as `{ "error": text }`.
    pub fn from_upstream(status: u16, text: &str) -> Self {
        let body = serde_json::from_str(text).unwrap_or_else(|_| serde_json::json!({ "error": text }));
        Self::ProviderApiError { status, body }
    }
}

impl HttpError for TtsError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ProviderApiError { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::ConnectionError(_) => StatusCode::BAD_GATEWAY,
            Self::MissingApiKey | Self::ConfigError(_) | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Credentials(e) => e.status_code(),
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::InternalError(Some(message)) => message.clone(),
            Self::InternalError(None) | Self::ConfigError(_) => "Internal server error".to_string(),
            Self::Credentials(e) => e.client_message(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for TtsError {
    fn into_response(self) -> Response {
        match self {
            Self::ProviderApiError { status, body } => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                (status, Json(body)).into_response()
            }
            Self::Credentials(e) => e.into_response(),
            other => {
                if matches!(other, Self::ConfigError(_) | Self::InternalError(None)) {
                    tracing::error!("{other:?}");
                }
                (other.status_code(), Json(ErrorBody::from_error(&other))).into_response()
            }
        }
    }
}
