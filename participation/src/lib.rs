//! # Freizeit Participation
//!
//! State machine for joining and leaving an event on the event-detail screen.
//!
//! The screen shows a participant count, a participant list and a join/leave
//! button. Those three have to agree with the backend even though the backend
//! is slow to reflect a join, sometimes omits the list, and answers a full
//! event with a bare `400`. The [`EventDetailReducer`] keeps them consistent:
//!
//! - A full event never reaches the backend; the user gets [`Prompt::EventFull`]
//! - Join and leave hold a [`ReconciliationGuard`] until a settle delay after
//!   their authoritative refetch, so focus refreshes and backfills cannot
//!   overwrite the result with stale data
//! - Leave removes the user's own participation record; leaving an event one
//!   is not part of sends nothing
//! - Membership comes from the server flag when present and from the
//!   participant list otherwise
//!
//! ## Example
//!
//! ```ignore
//! use freizeit_participation::*;
//! use freizeit_runtime::Store;
//!
//! let store = Store::new(
//!     EventDetailState::new(event_id, Some(user)),
//!     EventDetailReducer::new(),
//!     EventDetailEnvironment::new(api, Arc::new(SystemClock), ReconcilerConfig::default()),
//! );
//!
//! store.send(EventDetailAction::Mounted).await?;
//! store.send(EventDetailAction::JoinTapped).await?;
//! ```

pub mod actions;
pub mod config;
pub mod environment;
pub mod membership;
pub mod messages;
pub mod reducer;
pub mod state;

pub use actions::{EventDetailAction, FetchReason};
pub use config::{Config, ReconcilerConfig};
pub use environment::EventDetailEnvironment;
pub use reducer::EventDetailReducer;
pub use state::{Alert, EventDetailState, PendingOperation, Prompt, ReconciliationGuard};
