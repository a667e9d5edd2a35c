//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (VITRINE_*, nested with `__`, plus plain `PORT`)
//! 2. TOML config file (if VITRINE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (VITRINE_*, then `PORT`)
/// 2. TOML config file (if VITRINE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listen port.
    ///
    /// Set via PORT or VITRINE_PORT environment variable.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Persistent cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Upstream catalog settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Directory of static files served for unmatched routes.
    ///
    /// Set via VITRINE_STATIC_DIR environment variable.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

/// Cache store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Root directory of the sharded cache tree.
    ///
    /// Set via VITRINE_CACHE__DIR environment variable.
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,

    /// Entry lifetime in milliseconds.
    ///
    /// Set via VITRINE_CACHE__TTL_MS environment variable.
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,
}

/// Upstream catalog API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the catalog search API.
    ///
    /// Set via VITRINE_UPSTREAM__BASE_URL environment variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    ///
    /// Set via VITRINE_UPSTREAM__TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_port() -> u16 {
    8080
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./data/cache")
}

fn default_ttl_ms() -> u64 {
    300_000 // 5 min
}

fn default_base_url() -> String {
    "https://api.mercadolibre.com/sites/MLB/".into()
}

fn default_timeout_ms() -> u64 {
    15_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { dir: default_cache_dir(), ttl_ms: default_ttl_ms() }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { base_url: default_base_url(), timeout_ms: default_timeout_ms() }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            cache: CacheConfig::default(),
            upstream: UpstreamConfig::default(),
            static_dir: None,
        }
    }
}

impl CacheConfig {
    /// TTL as Duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl UpstreamConfig {
    /// Timeout as Duration for use with reqwest.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl AppConfig {
    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `VITRINE_`
    /// 2. The plain `PORT` environment variable
    /// 3. TOML file from `VITRINE_CONFIG_FILE` (if set)
    /// 4. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("VITRINE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment
            .merge(Env::raw().only(&["PORT"]).map(|key| key.as_str().to_lowercase().into()))
            .merge(
                Env::prefixed("VITRINE_")
                    .ignore(&["CONFIG_FILE"])
                    .map(|key| key.as_str().to_lowercase().into())
                    .split("__"),
            );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
