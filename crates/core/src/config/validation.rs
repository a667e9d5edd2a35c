//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Longest accepted cache TTL (7 days).
const MAX_TTL_MS: u64 = 7 * 24 * 60 * 60 * 1000;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `port` is 0
    /// - `cache.dir` is empty
    /// - `cache.ttl_ms` is 0 or exceeds 7 days
    /// - `upstream.timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `upstream.base_url` is not an http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid { field: "port".into(), reason: "must be greater than 0".into() });
        }

        if self.cache.dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid { field: "cache.dir".into(), reason: "must not be empty".into() });
        }
        if self.cache.ttl_ms == 0 {
            return Err(ConfigError::Invalid { field: "cache.ttl_ms".into(), reason: "must be at least 1ms".into() });
        }
        if self.cache.ttl_ms > MAX_TTL_MS {
            return Err(ConfigError::Invalid { field: "cache.ttl_ms".into(), reason: "must not exceed 7 days".into() });
        }

        if self.upstream.timeout_ms < 100 {
            return Err(ConfigError::Invalid {
                field: "upstream.timeout_ms".into(),
                reason: "must be at least 100ms".into(),
            });
        }
        if self.upstream.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "upstream.timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        match url::Url::parse(&self.upstream.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(ConfigError::Invalid {
                    field: "upstream.base_url".into(),
                    reason: "must be an absolute http(s) URL".into(),
                });
            }
        }

        if let Some(dir) = self.static_dir.as_ref().filter(|dir| !dir.is_dir()) {
            tracing::warn!(static_dir = %dir.display(), "static_dir does not exist; static files will 404");
        }

        Ok(())
    }
}
