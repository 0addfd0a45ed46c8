use shared::error::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid API base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("invalid API path '{path}': {source}")]
    InvalidPath {
        path: String,
        source: url::ParseError,
    },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API returned {status}: {}", .error.message)]
    Api { status: u16, error: ApiError },
}

pub type Result<T> = std::result::Result<T, ClientError>;
