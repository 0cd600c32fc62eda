//! Error handling for the tracker API client.
//!
//! Wraps transport and HTTP-status failures in a common structure so the
//! rest of the crate can translate them into user-facing errors without
//! caring which request failed.

use std::fmt;

use crate::error::CheckError;

/// API error preserving HTTP status information.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code, if the server answered at all
    pub status: Option<reqwest::StatusCode>,
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    /// Create a new API error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Create a new API error from an HTTP status.
    pub fn with_status(message: impl Into<String>, status: reqwest::StatusCode) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status
            .is_some_and(|s| s == reqwest::StatusCode::NOT_FOUND)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({})", self.message, status),
            None => write!(f, "{}", self.message),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ApiError::with_status(err.to_string(), status),
            None => ApiError::new(err.to_string()),
        }
    }
}

impl From<ApiError> for CheckError {
    fn from(error: ApiError) -> Self {
        CheckError::Api(error.to_string())
    }
}
