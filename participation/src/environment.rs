//! Dependencies injected into the event-detail reducer.

use crate::config::ReconcilerConfig;
use freizeit_api::EventsApi;
use freizeit_core::environment::Clock;
use std::sync::Arc;

/// Environment for [`EventDetailReducer`](crate::EventDetailReducer)
///
/// Generic over the backend so tests run against
/// [`MockEventsApi`](freizeit_api::MockEventsApi).
#[derive(Clone)]
pub struct EventDetailEnvironment<A>
where
    A: EventsApi + Clone,
{
    /// Events backend
    pub api: A,
    /// Clock for local timestamps
    pub clock: Arc<dyn Clock>,
    /// Reconciler timing
    pub config: ReconcilerConfig,
}

impl<A> EventDetailEnvironment<A>
where
    A: EventsApi + Clone,
{
    /// Creates a new `EventDetailEnvironment`
    #[must_use]
    pub fn new(api: A, clock: Arc<dyn Clock>, config: ReconcilerConfig) -> Self {
        Self { api, clock, config }
    }
}
