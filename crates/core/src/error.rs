//! Failure classification shared by the client and the synchronizer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Where a failure happened.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The request went out but no response came back.
    Transport,
    /// The server answered with a non-success status.
    Response,
    /// Something failed before a request was issued (or after, while decoding).
    Local,
}

/// Structured failure of one API interaction.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
#[error("{message}")]
pub struct ApiError {
    pub kind: FailureKind,
    /// HTTP status, for response failures only.
    pub status: Option<u16>,
    /// Raw message from the server or the failing layer.
    pub message: String,
    /// Decoded error body, when the server sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Transport,
            status: None,
            message: message.into(),
            details: None,
        }
    }

    pub fn response(status: u16, message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            kind: FailureKind::Response,
            status: Some(status),
            message: message.into(),
            details,
        }
    }

    pub fn local(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Local,
            status: None,
            message: message.into(),
            details: None,
        }
    }

    /// Message suitable for showing to an operator.
    pub fn user_message(&self) -> String {
        user_message(self)
    }
}

/// Converts a raw error into an [`ApiError`].
pub trait Classify {
    /// Structured view of this error.
    fn classify(&self) -> ApiError;
}

impl Classify for ApiError {
    fn classify(&self) -> ApiError {
        self.clone()
    }
}

/// Fallback text when a response carries no error message.
pub const GENERIC_RESPONSE_MESSAGE: &str = "An API error occurred";

/// Pulls the server's `error` field out of a response body.
pub fn response_message(body: Option<&Value>) -> String {
    body.and_then(|b| b.get("error"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(GENERIC_RESPONSE_MESSAGE)
        .to_string()
}

/// Operator-facing text: fixed wording for known statuses and transport
/// failures, the raw message otherwise.
pub fn user_message(err: &ApiError) -> String {
    match err.kind {
        FailureKind::Transport => "Network error. Please check your connection.".to_string(),
        FailureKind::Local => non_empty_or_default(&err.message),
        FailureKind::Response => match err.status {
            Some(400) => "Invalid request. Please check your input.".to_string(),
            Some(401) => "Authentication required. Please log in.".to_string(),
            Some(403) => "You do not have permission to perform this action.".to_string(),
            Some(404) => "The requested resource was not found.".to_string(),
            Some(500) => "Internal server error. Please try again later.".to_string(),
            _ => non_empty_or_default(&err.message),
        },
    }
}

fn non_empty_or_default(message: &str) -> String {
    if message.is_empty() {
        "An unexpected error occurred.".to_string()
    } else {
        message.to_string()
    }
}
