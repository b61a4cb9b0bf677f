use std::time::Duration;

use axum::http;
use reqwest::Client;

use crate::error::TtsError;

/// Pooled HTTP client for upstream calls
///
/// Clones share the same connection pool.
pub fn http_client(timeout: Duration) -> crate::Result<Client> {
    let mut headers = http::HeaderMap::new();
    headers.insert(http::header::CONNECTION, http::HeaderValue::from_static("keep-alive"));

    Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Some(Duration::from_secs(5)))
        .tcp_nodelay(true)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .default_headers(headers)
        .build()
        .map_err(|e| TtsError::ConfigError(format!("failed to build HTTP client: {e}")))
}
