//! Client configuration
//!
//! Loaded from environment variables with defaults suitable for the local
//! development backend.

use crate::error::ConfigError;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default backend base URL (development server on the local network)
pub const DEFAULT_BASE_URL: &str = "http://192.168.2.120:8000/api";

/// Configuration for [`ApiClient`](crate::ApiClient)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL including the `/api` prefix, without trailing slash
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// How long a health check result stays cached, in seconds
    pub health_ttl_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 15,
            health_ttl_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables
    ///
    /// - `FREIZEIT_API_URL` (default `http://192.168.2.120:8000/api`)
    /// - `FREIZEIT_API_TIMEOUT_SECS` (default 15)
    /// - `FREIZEIT_HEALTH_TTL_SECS` (default 30)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL is not absolute http(s).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            base_url: env::var("FREIZEIT_API_URL").unwrap_or(defaults.base_url),
            timeout_secs: env::var("FREIZEIT_API_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            health_ttl_secs: env::var("FREIZEIT_HEALTH_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.health_ttl_secs),
        };
        config.validated()
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout in seconds
    #[must_use]
    pub const fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the health cache TTL in seconds
    #[must_use]
    pub const fn with_health_ttl_secs(mut self, secs: u64) -> Self {
        self.health_ttl_secs = secs;
        self
    }

    /// Normalize the base URL and check that it is usable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL does not parse or is
    /// not http(s).
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        let trimmed = self.base_url.trim().trim_end_matches('/').to_string();
        let url = Url::parse(&trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url,
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        self.base_url = trimmed;
        Ok(self)
    }

    /// Request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Health cache TTL
    #[must_use]
    pub const fn health_ttl(&self) -> Duration {
        Duration::from_secs(self.health_ttl_secs)
    }

    /// Base URL of the server root (the base URL without its `/api` suffix)
    ///
    /// Media paths returned by the backend are relative to this.
    #[must_use]
    pub fn media_root(&self) -> &str {
        self.base_url
            .strip_suffix("/api")
            .unwrap_or(&self.base_url)
    }
}
