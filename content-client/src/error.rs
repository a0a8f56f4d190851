use thiserror::Error;

/// Why a request to the content backend produced no usable page.
///
/// Callers treat every variant the same way: no further items are
/// available until the user explicitly retries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport failure (offline, DNS, timeout) or an unexpected HTTP status.
    #[error("network error: {0}")]
    Network(String),

    /// The backend rejected the API token.
    #[error("backend rejected the API token (HTTP {status})")]
    Auth { status: u16 },

    /// The response body did not have the expected `data` / `meta.pagination` shape.
    #[error("unexpected response shape: {0}")]
    Schema(String),
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "network",
            FetchError::Auth { .. } => "auth",
            FetchError::Schema(_) => "schema",
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Schema(err.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}
