//! Outcome classification for calls to the TaskBoard service.
//!
//! Every call that is sent ends in exactly one of: success, a server failure
//! carrying the response text, or a network failure. A call that cannot be
//! addressed safely is refused before sending.

use reqwest::StatusCode;

/// Message shown for any transport-level failure
pub const NETWORK_ERROR_MESSAGE: &str = "Network error";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// Non-2xx response. `message` is the raw response body.
    #[error("{}", server_display(.status, .message))]
    Server { status: StatusCode, message: String },

    /// The request could not complete, or its response could not be read.
    /// `detail` is kept for logs only and is never shown.
    #[error("Network error")]
    Network { detail: String },

    /// Refused before anything was sent
    #[error("{message}")]
    Invalid { message: String },
}

fn server_display(status: &StatusCode, message: &str) -> String {
    if message.trim().is_empty() {
        format!("Request failed with status {}", status)
    } else {
        message.to_string()
    }
}

impl RequestError {
    pub fn server(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self::Network {
            detail: detail.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Text to show the user: the server's body verbatim, or `fallback` when
    /// the body is empty. Network failures always read "Network error".
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            RequestError::Server { message, .. } if !message.trim().is_empty() => message.clone(),
            RequestError::Server { .. } => fallback.to_string(),
            RequestError::Network { .. } => NETWORK_ERROR_MESSAGE.to_string(),
            RequestError::Invalid { message } => message.clone(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Server { status, .. } => Some(*status),
            RequestError::Network { .. } | RequestError::Invalid { .. } => None,
        }
    }

}
