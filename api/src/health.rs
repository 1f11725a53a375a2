//! Cached backend health check

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Result of a health check
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HealthStatus {
    /// The backend answered `/health/` successfully
    Healthy,
    /// The check failed
    Unhealthy {
        /// Why the check failed
        reason: String,
    },
}

impl HealthStatus {
    /// Whether the backend is reachable and healthy
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Remembers the last check result for a fixed time-to-live
///
/// Failures are cached as well so an unreachable backend is not hammered.
#[derive(Debug)]
pub struct HealthCache {
    ttl: Duration,
    last: Mutex<Option<(Instant, HealthStatus)>>,
}

impl HealthCache {
    /// Create an empty cache
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            last: Mutex::new(None),
        }
    }

    /// Cached status, if still fresh
    pub async fn get(&self) -> Option<HealthStatus> {
        let last = self.last.lock().await;
        last.as_ref()
            .filter(|(checked_at, _)| checked_at.elapsed() < self.ttl)
            .map(|(_, status)| status.clone())
    }

    /// Record a fresh check result
    pub async fn put(&self, status: HealthStatus) {
        *self.last.lock().await = Some((Instant::now(), status));
    }
}
