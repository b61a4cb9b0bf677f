use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> anyhow::Result<()> {
        self.chunking
            .budget()
            .map_err(|e| anyhow::anyhow!("invalid [chunking] section: {e}"))?;

        self.validate_credentials()?;
        self.validate_upstream()?;

        if self.generation.ttl_secs == 0 {
            anyhow::bail!("generation.ttl_secs must be greater than 0");
        }

        if self.generation.capacity == 0 {
            anyhow::bail!("generation.capacity must be greater than 0");
        }

        if self.server.body_limit_bytes == 0 {
            anyhow::bail!("server.body_limit_bytes must be greater than 0");
        }

        Ok(())
    }

    fn validate_credentials(&self) -> anyhow::Result<()> {
        if self.credentials.slots.is_empty() {
            anyhow::bail!("at least one credential slot must be configured");
        }

        if let crate::StoreConfig::File { ref path } = self.credentials.store
            && path.as_os_str().is_empty()
        {
            anyhow::bail!("credentials.store.path must not be empty");
        }

        Ok(())
    }

    fn validate_upstream(&self) -> anyhow::Result<()> {
        let url = url::Url::parse(&self.elevenlabs.base_url)
            .map_err(|e| anyhow::anyhow!("invalid elevenlabs.base_url '{}': {e}", self.elevenlabs.base_url))?;

        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("elevenlabs.base_url must use http or https");
        }

        if self.elevenlabs.timeout_secs == 0 {
            anyhow::bail!("elevenlabs.timeout_secs must be greater than 0");
        }

        Ok(())
    }
}
