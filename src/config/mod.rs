//! Configuration module for the question-bank navigator.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the question-bank API
    pub api_url: String,
    /// API key sent with every request, if the backend requires one
    pub api_key: Option<String>,
    /// Path to the SQLite preference database
    pub prefs_path: PathBuf,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Whether a committed filter covers the whole category subtree
    pub include_subcategories: bool,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_url =
            env::var("QBANK_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());

        let api_key = env::var("QBANK_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let prefs_path = env::var("QBANK_PREFS_PATH")
            .unwrap_or_else(|_| "./data/preferences.sqlite".to_string())
            .into();

        let request_timeout = match env::var("QBANK_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(
                        "Invalid QBANK_REQUEST_TIMEOUT_SECS {:?}, using {}s",
                        raw,
                        DEFAULT_TIMEOUT_SECS
                    );
                    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
                }
            },
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let include_subcategories = env::var("QBANK_INCLUDE_SUBCATEGORIES")
            .map(|raw| matches!(raw.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let log_level = env::var("QBANK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            api_url,
            api_key,
            prefs_path,
            request_timeout,
            include_subcategories,
            log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Defaults first, then overrides, in one test to avoid env races
        env::remove_var("QBANK_API_URL");
        env::remove_var("QBANK_API_KEY");
        env::remove_var("QBANK_PREFS_PATH");
        env::remove_var("QBANK_REQUEST_TIMEOUT_SECS");
        env::remove_var("QBANK_INCLUDE_SUBCATEGORIES");
        env::remove_var("QBANK_LOG_LEVEL");

        let config = Config::from_env();

        assert_eq!(config.api_url, "http://127.0.0.1:8080");
        assert!(config.api_key.is_none());
        assert_eq!(config.prefs_path, PathBuf::from("./data/preferences.sqlite"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(!config.include_subcategories);
        assert_eq!(config.log_level, "info");

        env::set_var("QBANK_REQUEST_TIMEOUT_SECS", "abc");
        env::set_var("QBANK_INCLUDE_SUBCATEGORIES", "true");
        env::set_var("QBANK_API_KEY", "  ");

        let config = Config::from_env();

        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.include_subcategories);
        assert!(config.api_key.is_none());

        env::remove_var("QBANK_REQUEST_TIMEOUT_SECS");
        env::remove_var("QBANK_INCLUDE_SUBCATEGORIES");
        env::remove_var("QBANK_API_KEY");
    }
}
