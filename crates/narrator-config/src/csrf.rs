use serde::Deserialize;

/// CSRF header check for state-changing requests
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CsrfConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_header_name")]
    pub header_name: String,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            header_name: default_header_name(),
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_enabled() -> bool {
    true
}

fn default_header_name() -> String {
    "X-Narrator-CSRF-Protection".to_string()
}
