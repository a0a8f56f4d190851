use thiserror::Error;

/// Environment variable holding the backend base URL.
pub const ENV_API_URL: &str = "CONTENT_API_URL";
/// Environment variable holding the read-only API token.
pub const ENV_API_TOKEN: &str = "CONTENT_API_TOKEN";

const DEFAULT_POPULATE: &str = "*";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration value: {0}")]
    Missing(&'static str),

    #[error("invalid base URL `{0}`: expected an http:// or https:// URL")]
    InvalidBaseUrl(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Connection settings for the content backend.
///
/// Resolved once at startup and handed to the client explicitly.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    api_token: String,
    populate: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::Missing(ENV_API_URL));
        }
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(base_url));
        }

        let api_token = api_token.into().trim().to_string();
        if api_token.is_empty() {
            return Err(ConfigError::Missing(ENV_API_TOKEN));
        }

        Ok(Self {
            base_url: trimmed.to_string(),
            api_token,
            populate: DEFAULT_POPULATE.to_string(),
        })
    }

    /// Read `CONTENT_API_URL` and `CONTENT_API_TOKEN` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(ENV_API_URL).ok_or(ConfigError::Missing(ENV_API_URL))?;
        let api_token = lookup(ENV_API_TOKEN).ok_or(ConfigError::Missing(ENV_API_TOKEN))?;
        Self::new(base_url, api_token)
    }

    /// Override the `populate` query value (defaults to `*`).
    pub fn with_populate(mut self, populate: impl Into<String>) -> Self {
        self.populate = populate.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    pub fn populate(&self) -> &str {
        &self.populate
    }
}

// Keep the token out of logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"<redacted>")
            .field("populate", &self.populate)
            .finish()
    }
}
