//! # Freizeit API Client
//!
//! Rust client for the Freizeit events backend (a Django REST API).
//!
//! ## Example
//!
//! ```no_run
//! use freizeit_api::{ApiClient, EventsApi, EventId, InMemorySessionStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Configured from FREIZEIT_API_URL and friends
//!     let client = ApiClient::from_env(Arc::new(InMemorySessionStore::new()))?;
//!
//!     if client.check_health().await.is_healthy() {
//!         let event = client.fetch_event(EventId::new(42)).await?;
//!         println!("{} ({} Teilnehmer)", event.title, event.participant_count);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - Events, participants, comments and friends endpoints
//! - `Token` authentication from a pluggable [`SessionStore`]
//! - Backend error messages extracted from Django-style error bodies
//! - Cached health check
//! - [`EventsApi`] trait with an in-memory [`MockEventsApi`]

pub mod client;
pub mod config;
pub mod error;
pub mod health;
pub mod mocks;
pub mod provider;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use client::ApiClient;
pub use config::ApiConfig;
pub use error::{ApiError, ConfigError, Result};
pub use health::{HealthCache, HealthStatus};
pub use mocks::{MockCall, MockEventsApi};
pub use provider::EventsApi;
pub use session::{InMemorySessionStore, SessionStore};
pub use types::{
    Comment, CommentId, Event, EventId, Friend, LeaveOutcome, Participant, ParticipationId,
    UserId, UserSummary,
};
