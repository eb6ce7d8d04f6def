use thiserror::Error;

/// Failures raised by the ranking and analysis clients.
///
/// Kept `Clone` so results can travel inside [`crate::state::Delta`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("request timed out")]
    Timeout,

    #[error("unsupported media type: {media_type} (expected video/*)")]
    UnsupportedMediaType { media_type: String },

    #[error("unable to read {path}: {reason}")]
    FileRead { path: String, reason: String },

    #[error("backend reported an error: {0}")]
    Backend(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Short tag for the console and log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "network",
            ApiError::Http { .. } => "http",
            ApiError::Decode(_) => "decode",
            ApiError::Timeout => "timeout",
            ApiError::UnsupportedMediaType { .. } => "media",
            ApiError::FileRead { .. } => "file",
            ApiError::Backend(_) => "backend",
            ApiError::Config(_) => "config",
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Http {
                status: status.as_u16(),
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
