use http::HeaderMap;
use secrecy::SecretString;

/// Header carrying a raw upstream API key chosen by an admin
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header selecting a key from the admin-managed pool by id
pub const POOL_KEY_HEADER: &str = "x-pool-key-id";

/// Header selecting one of the configured account slots
pub const ACCOUNT_INDEX_HEADER: &str = "x-account-index";

/// Which credential a request wants to use upstream
#[derive(Debug, Clone)]
pub enum CredentialSelector {
    /// A key passed directly by the caller
    Direct(SecretString),
    /// A key in the admin-managed pool
    Pool(String),
    /// A configured account slot
    Slot(usize),
}

impl CredentialSelector {
    /// Read the selector from request headers
    ///
    /// Precedence is `x-api-key`, then `x-pool-key-id`, then
    /// `x-account-index`. A missing or unparsable index selects slot 0.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        if let Some(key) = non_empty_header(headers, API_KEY_HEADER) {
            return Self::Direct(SecretString::from(key.to_string()));
        }

        if let Some(id) = non_empty_header(headers, POOL_KEY_HEADER) {
            return Self::Pool(id.to_string());
        }

        let index = headers
            .get(ACCOUNT_INDEX_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        Self::Slot(index)
    }
}

fn non_empty_header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl Default for CredentialSelector {
    fn default() -> Self {
        Self::Slot(0)
    }
}
