//! Client error types

use thiserror::Error;

/// Protocol client error
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid Content-Range format: {0}")]
    InvalidContentRange(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Unsupported API response: {0}")]
    UnsupportedResponse(u16),

    #[error("Unsupported response body: {0}")]
    UnsupportedBody(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
