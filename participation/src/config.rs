//! Configuration for the participation reconciler and the demo binary.
//!
//! Loads configuration from environment variables with sensible defaults.

use freizeit_api::{ApiConfig, ConfigError};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Timing of the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// How long the guard stays held after an operation's refetch, in
    /// milliseconds (default: 1000)
    pub settle_delay_ms: u64,
    /// Delay between regaining focus and refreshing, in milliseconds
    /// (default: 500)
    pub focus_refresh_delay_ms: u64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 1000,
            focus_refresh_delay_ms: 500,
        }
    }
}

impl ReconcilerConfig {
    /// Load from `FREIZEIT_SETTLE_DELAY_MS` and
    /// `FREIZEIT_FOCUS_REFRESH_DELAY_MS`
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            settle_delay_ms: env::var("FREIZEIT_SETTLE_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.settle_delay_ms),
            focus_refresh_delay_ms: env::var("FREIZEIT_FOCUS_REFRESH_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.focus_refresh_delay_ms),
        }
    }

    /// Set the settle delay
    #[must_use]
    pub const fn with_settle_delay_ms(mut self, ms: u64) -> Self {
        self.settle_delay_ms = ms;
        self
    }

    /// Set the focus refresh delay
    #[must_use]
    pub const fn with_focus_refresh_delay_ms(mut self, ms: u64) -> Self {
        self.focus_refresh_delay_ms = ms;
        self
    }

    /// Settle delay
    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Focus refresh delay
    #[must_use]
    pub const fn focus_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.focus_refresh_delay_ms)
    }
}

/// Demo binary configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend client configuration
    pub api: ApiConfig,
    /// Reconciler timing
    pub reconciler: ReconcilerConfig,
    /// Use the real backend instead of the in-memory one
    pub use_backend: bool,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// The real backend is used when `FREIZEIT_API_URL` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the backend URL is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api: ApiConfig::from_env()?,
            reconciler: ReconcilerConfig::from_env(),
            use_backend: env::var("FREIZEIT_API_URL").is_ok(),
        })
    }
}
