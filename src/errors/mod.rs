//! Error handling module for the question-bank navigator.
//!
//! Provides a single error type covering backend fetches, preference
//! persistence and input validation, plus conversion into displayable
//! status messages.

use crate::models::StatusMessage;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const HTTP_ERROR: &str = "HTTP_ERROR";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const PREFERENCES_ERROR: &str = "PREFERENCES_ERROR";
}

/// Application error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// The request never produced a response (connect, timeout, ...)
    Network(String),
    /// The backend answered with a non-success status
    Http { status: u16, message: String },
    /// The response body could not be decoded
    Decode(String),
    /// Invalid input or an action attempted in the wrong state
    Validation(String),
    /// Preference store failure
    Preferences(String),
}

impl AppError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Network(_) => codes::NETWORK_ERROR,
            AppError::Http { .. } => codes::HTTP_ERROR,
            AppError::Decode(_) => codes::DECODE_ERROR,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::Preferences(_) => codes::PREFERENCES_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Network(msg) => msg.clone(),
            AppError::Http { status, message } => format!("HTTP {}: {}", status, message),
            AppError::Decode(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Preferences(msg) => msg.clone(),
        }
    }

    /// True for failures of a backend call (network, HTTP status or payload).
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            AppError::Network(_) | AppError::Http { .. } | AppError::Decode(_)
        )
    }

    /// Convert into a dismissible status message with some context.
    pub fn to_status(&self, context: &str) -> StatusMessage {
        StatusMessage::error(format!("{}: {}", context, self.message()))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("HTTP client error: {:?}", err);
        if let Some(status) = err.status() {
            AppError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            AppError::Decode(format!("Invalid response body: {}", err))
        } else {
            AppError::Network(format!("Request failed: {}", err))
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Preferences(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::Decode(format!("JSON error: {}", err))
    }
}
