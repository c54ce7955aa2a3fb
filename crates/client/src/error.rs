use mtxpanel_core::error::{ApiError, Classify};
use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors returned by [`crate::MediaMtxApi`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid API URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// No response was received (connect refused, timeout, reset).
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Response {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("could not build request: {0}")]
    Request(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else if e.is_builder() {
            ClientError::Request(e.to_string())
        } else {
            ClientError::Transport(e)
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

impl Classify for ClientError {
    fn classify(&self) -> ApiError {
        match self {
            ClientError::Transport(e) => ApiError::transport(e.to_string()),
            ClientError::Response {
                status,
                message,
                body,
            } => ApiError::response(*status, message.clone(), body.clone()),
            ClientError::InvalidUrl { .. } | ClientError::Decode(_) | ClientError::Request(_) => {
                ApiError::local(self.to_string())
            }
        }
    }
}
