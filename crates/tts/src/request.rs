use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, FromRequestParts},
    http::StatusCode,
};
use narrator_core::CredentialSelector;
use serde::de::DeserializeOwned;

use crate::error::TtsError;

/// Per-request context for upstream calls
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Which key to call upstream with
    pub credentials: CredentialSelector,
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut http::request::Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            credentials: CredentialSelector::from_headers(&parts.headers),
        })
    }
}

/// Extractor for JSON request bodies
///
/// The body size limit comes from the router's `DefaultBodyLimit`.
pub struct ExtractPayload<T>(pub RequestContext, pub T);

impl<S, T: DeserializeOwned> FromRequest<S> for ExtractPayload<T>
where
    S: Send + Sync,
{
    type Rejection = TtsError;

    async fn from_request(request: http::Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = request
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        if !is_json {
            return Err(TtsError::UnsupportedMediaType);
        }

        let (mut parts, body) = request.into_parts();
        let Ok(context) = RequestContext::from_request_parts(&mut parts, state).await;

        let bytes = Bytes::from_request(http::Request::from_parts(parts, body), state)
            .await
            .map_err(|rejection| {
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    TtsError::PayloadTooLarge
                } else {
                    TtsError::InvalidRequest(format!("Failed to read request body: {}", rejection.body_text()))
                }
            })?;

        let body = serde_json::from_slice::<T>(&bytes)
            .map_err(|e| TtsError::InvalidRequest(format!("Failed to parse request body: {e}")))?;

        Ok(Self(context, body))
    }
}
