use std::net::SocketAddr;

use serde::Deserialize;

use crate::{cors::CorsConfig, csrf::CsrfConfig, health::HealthConfig};

/// Default request body ceiling, sized for base64 voice samples
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 50 << 20;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_address: Option<SocketAddr>,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub cors: Option<CorsConfig>,
    #[serde(default)]
    pub csrf: Option<CsrfConfig>,
    /// Largest accepted JSON body in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: None,
            health: HealthConfig::default(),
            cors: None,
            csrf: None,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

const fn default_body_limit() -> usize {
    DEFAULT_BODY_LIMIT_BYTES
}
