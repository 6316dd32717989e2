//! Transient, dismissible status messages shown by the UI.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl StatusMessage {
    fn with_level(level: StatusLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::with_level(StatusLevel::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::with_level(StatusLevel::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::with_level(StatusLevel::Error, text)
    }

    pub fn is_error(&self) -> bool {
        self.level == StatusLevel::Error
    }
}
