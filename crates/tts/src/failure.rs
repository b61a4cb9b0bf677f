//! Classification of upstream synthesis failures

use axum::http::StatusCode;
use narrator_core::HttpError;
use serde::Serialize;
use serde_json::Value;

use crate::error::TtsError;

const PLAN_LIMIT_MESSAGE: &str =
    "Plan Limit Reached: This feature requires a paid ElevenLabs plan or you have exceeded your quota.";

/// Broad category of a failed synthesis call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    PlanLimit,
    InvalidRequest,
    Authentication,
    Upstream,
}

/// A failed synthesis call, ready to show to a user
#[derive(Debug, Clone)]
pub struct UpstreamFailure {
    pub status: StatusCode,
    pub kind: FailureKind,
    pub message: String,
}

impl UpstreamFailure {
    /// Classify an upstream error response
    ///
    /// Understands both `{ detail: { status, code, message } }` and
    /// `{ error: string }`, where the string may itself hold the detail
    /// object as JSON.
    pub fn classify(status: u16, body: &Value) -> Self {
        let http_status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
        let fallback_kind = if http_status == StatusCode::UNAUTHORIZED {
            FailureKind::Authentication
        } else {
            FailureKind::Upstream
        };

        let (kind, message) = match body.get("detail").filter(|detail| detail.is_object()) {
            Some(detail) => classify_detail(detail, fallback_kind, http_status),
            None => (fallback_kind, api_error_message(body, http_status)),
        };

        Self {
            status: http_status,
            kind,
            message,
        }
    }

    /// Describe any error raised while synthesizing a chunk
    pub fn from_error(error: &TtsError) -> Self {
        match error {
            TtsError::ProviderApiError { status, body } => Self::classify(*status, body),
            other => Self {
                status: other.status_code(),
                kind: FailureKind::Upstream,
                message: format!("API Error: {}", other.client_message()),
            },
        }
    }
}

fn classify_detail(detail: &Value, fallback_kind: FailureKind, status: StatusCode) -> (FailureKind, String) {
    let field = |name: &str| detail.get(name).and_then(Value::as_str);
    let message = field("message");

    if field("status") == Some("payment_required") || field("code") == Some("paid_plan_required") {
        return (FailureKind::PlanLimit, PLAN_LIMIT_MESSAGE.to_string());
    }

    if field("status") == Some("invalid_request") || field("code") == Some("bad_request") {
        let message = message.unwrap_or("unknown error");

        if message.to_lowercase().contains("paid plan") {
            return (FailureKind::PlanLimit, format!("Plan Limit Reached: {message}"));
        }

        return (FailureKind::InvalidRequest, format!("Invalid Request: {message}"));
    }

    let message = message.map_or_else(|| generic_message(status), |message| format!("API Error: {message}"));

    (fallback_kind, message)
}

fn api_error_message(body: &Value, status: StatusCode) -> String {
    let Some(error) = body.get("error").and_then(Value::as_str) else {
        return generic_message(status);
    };

    let nested = serde_json::from_str::<Value>(error).ok();
    let nested_message = nested
        .as_ref()
        .and_then(|nested| nested.get("detail"))
        .and_then(|detail| detail.get("message"))
        .and_then(Value::as_str);

    format!("API Error: {}", nested_message.unwrap_or(error))
}

fn generic_message(status: StatusCode) -> String {
    format!(
        "API Error: {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    )
}
