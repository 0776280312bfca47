//! Converter configuration.

use std::time::Duration;

use eurofx_common::Currency;
use eurofx_fx::ECB_DAILY_FEED_URL;

/// Configuration for the `eurofx` binary.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// URL of the reference rate feed.
    pub feed_url: String,
    /// Currency converted from when none is given.
    pub default_from: String,
    /// Currency converted to when none is given.
    pub default_to: String,
    /// HTTP timeout for the feed request. `None` keeps the client default.
    pub request_timeout: Option<Duration>,
    /// Log level.
    pub log_level: String,
    /// Emit logs as JSON lines.
    pub log_json: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            feed_url: ECB_DAILY_FEED_URL.to_string(),
            default_from: "EUR".to_string(),
            default_to: "USD".to_string(),
            request_timeout: None,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("EUROFX_FEED_URL") {
            config.feed_url = url;
        }

        if let Some(code) = lookup("EUROFX_DEFAULT_FROM") {
            config.default_from = code;
        }

        if let Some(code) = lookup("EUROFX_DEFAULT_TO") {
            config.default_to = code;
        }

        if let Some(secs) = lookup("EUROFX_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.request_timeout = Some(Duration::from_secs(secs));
            }
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level;
        }

        if let Some(json) = lookup("EUROFX_LOG_JSON") {
            config.log_json = matches!(json.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.feed_url.is_empty() {
            return Err("Feed URL cannot be empty".to_string());
        }

        Currency::parse(&self.default_from)
            .map_err(|e| format!("Default source currency: {}", e))?;
        Currency::parse(&self.default_to)
            .map_err(|e| format!("Default target currency: {}", e))?;

        if self.request_timeout.is_some_and(|t| t.is_zero()) {
            return Err("Request timeout cannot be zero".to_string());
        }

        Ok(())
    }
}
