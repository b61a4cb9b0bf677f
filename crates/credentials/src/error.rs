use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use narrator_core::{ErrorBody, HttpError};
use thiserror::Error;

use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, CredentialError>;

/// Credential registry and admin errors
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Malformed admin request
    #[error("{0}")]
    InvalidRequest(String),

    /// Slot index outside the configured slots
    #[error("Invalid slot index")]
    InvalidSlot(i64),

    /// Upstream rejected the key during validation
    #[error("Invalid ElevenLabs API Key")]
    InvalidKey,

    /// Upstream could not be reached to validate a key
    #[error("Failed to validate key with ElevenLabs")]
    ValidationUnavailable(String),

    /// No pool key with the given id
    #[error("Key not found")]
    PoolKeyNotFound(String),

    /// Backing store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl HttpError for CredentialError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidSlot(_) => StatusCode::BAD_REQUEST,
            Self::InvalidKey => StatusCode::UNAUTHORIZED,
            Self::PoolKeyNotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationUnavailable(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Store(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for CredentialError {
    fn into_response(self) -> Response {
        match &self {
            Self::Store(e) => tracing::error!("credential store failure: {e}"),
            Self::ValidationUnavailable(e) => tracing::error!("key validation failed: {e}"),
            _ => {}
        }

        (self.status_code(), Json(ErrorBody::from_error(&self))).into_response()
    }
}
