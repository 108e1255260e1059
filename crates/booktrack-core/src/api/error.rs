use thiserror::Error;

use crate::auth::StorageError;
use crate::models::{ErrorBody, ValidationError};

/// Shown when no response was received at all.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error or server is unavailable";

/// Shown when the server rejected a request without saying why.
pub const GENERIC_SERVER_MESSAGE: &str = "Something went wrong";

/// Maximum length for error response bodies in log messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Every way an API operation can fail.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("You must be logged in")]
    Unauthenticated,

    #[error("{}", NETWORK_ERROR_MESSAGE)]
    Network(#[source] reqwest::Error),

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Build a `Server` error from a non-2xx response.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.summary())
            .unwrap_or_else(|| GENERIC_SERVER_MESSAGE.to_string());
        ApiError::Server {
            status: status.as_u16(),
            message,
        }
    }

    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The user has to log in (again) before retrying.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthenticated | ApiError::Server { status: 401, .. }
        )
    }

    /// Text suitable for an alert.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::InvalidResponse(_) => "Invalid response from server".to_string(),
            ApiError::Storage(_) => "Could not access saved login on this device".to_string(),
            other => other.to_string(),
        }
    }
}
