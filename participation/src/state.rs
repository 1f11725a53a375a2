//! State of the event-detail screen.

use crate::messages;
use crate::membership;
use freizeit_api::{Comment, Event, EventId, Participant, UserId, UserSummary};

/// Keeps background refreshes from overwriting an in-flight join or leave.
///
/// Every acquisition starts a new generation. A release only takes effect
/// for the generation that currently holds the guard, so the delayed release
/// of an earlier operation cannot unlock a later one. Background fetches
/// remember the generation they were issued under and are dropped when it
/// has moved on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconciliationGuard {
    generation: u64,
    held: Option<u64>,
}

impl ReconciliationGuard {
    /// A released guard at generation 0
    #[must_use]
    pub const fn new() -> Self {
        Self {
            generation: 0,
            held: None,
        }
    }

    /// Acquire the guard, returning the new generation
    pub const fn acquire(&mut self) -> u64 {
        self.generation += 1;
        self.held = Some(self.generation);
        self.generation
    }

    /// Release the guard if `generation` currently holds it
    ///
    /// Returns whether the guard was released.
    pub fn release(&mut self, generation: u64) -> bool {
        if self.held == Some(generation) {
            self.held = None;
            true
        } else {
            false
        }
    }

    /// Whether a mutation currently holds the guard
    #[must_use]
    pub const fn is_held(&self) -> bool {
        self.held.is_some()
    }

    /// Latest generation
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a background result issued under `generation` may be applied
    #[must_use]
    pub const fn admits(&self, generation: u64) -> bool {
        self.held.is_none() && self.generation == generation
    }
}

/// The join or leave request currently in flight
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingOperation {
    /// Join request in flight
    Join,
    /// Leave request in flight
    Leave,
}

/// A modal the caller must handle before the action can proceed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prompt {
    /// No user is logged in; the caller should route to the login screen
    LoginRequired,
    /// The event is at capacity; nothing was sent to the backend
    EventFull,
}

impl Prompt {
    /// Prompt title
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::LoginRequired => messages::LOGIN_REQUIRED_TITLE,
            Self::EventFull => messages::EVENT_FULL_TITLE,
        }
    }

    /// Prompt text
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::LoginRequired => messages::LOGIN_REQUIRED_MESSAGE,
            Self::EventFull => messages::EVENT_FULL_MESSAGE,
        }
    }
}

/// A dismissible notice
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    /// Title
    pub title: String,
    /// Message
    pub message: String,
}

impl Alert {
    /// Confirmation after joining
    #[must_use]
    pub fn joined() -> Self {
        Self {
            title: messages::JOINED_TITLE.to_string(),
            message: messages::JOINED_MESSAGE.to_string(),
        }
    }

    /// Confirmation after leaving
    #[must_use]
    pub fn left() -> Self {
        Self {
            title: messages::LEFT_TITLE.to_string(),
            message: messages::LEFT_MESSAGE.to_string(),
        }
    }

    /// Error notice
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            title: messages::ERROR_TITLE.to_string(),
            message: message.into(),
        }
    }
}

/// State of one event-detail screen
#[derive(Clone, Debug)]
pub struct EventDetailState {
    /// The event shown
    pub event_id: EventId,
    /// Loaded event (`None` before the first load or after it failed)
    pub event: Option<Event>,
    /// Comments, oldest first
    pub comments: Vec<Comment>,
    /// Friends of the current user, to mark them among participants
    pub friend_ids: Vec<UserId>,
    /// Logged-in user, if any
    pub current_user: Option<UserSummary>,
    /// Initial load in progress
    pub loading: bool,
    /// Reconciliation guard
    pub guard: ReconciliationGuard,
    /// Join or leave in flight (the button is disabled meanwhile)
    pub pending: Option<PendingOperation>,
    /// Alert to show
    pub alert: Option<Alert>,
    /// Prompt to show
    pub prompt: Option<Prompt>,
    /// A participant backfill is in flight
    pub backfill_in_flight: bool,
    /// `event.is_participant` was filled in locally rather than sent by the server
    membership_inferred: bool,
}

impl EventDetailState {
    /// Fresh state for an event that has not been loaded yet
    #[must_use]
    pub const fn new(event_id: EventId, current_user: Option<UserSummary>) -> Self {
        Self {
            event_id,
            event: None,
            comments: Vec::new(),
            friend_ids: Vec::new(),
            current_user,
            loading: false,
            guard: ReconciliationGuard::new(),
            pending: None,
            alert: None,
            prompt: None,
            backfill_in_flight: false,
            membership_inferred: false,
        }
    }

    /// Whether the current user takes part in the event
    #[must_use]
    pub fn is_joined(&self) -> bool {
        self.event.as_ref().is_some_and(|event| event.joined)
    }

    /// Participant count of the loaded event (0 when none is loaded)
    #[must_use]
    pub fn participant_count(&self) -> u32 {
        self.event.as_ref().map_or(0, |event| event.participant_count)
    }

    /// Whether the loaded event is at capacity
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.event.as_ref().is_some_and(Event::is_full)
    }

    /// Participants who are friends of the current user
    #[must_use]
    pub fn friend_participants(&self) -> Vec<&Participant> {
        self.event
            .as_ref()
            .map(|event| {
                event
                    .participant_list()
                    .iter()
                    .filter(|p| self.friend_ids.contains(&p.user.id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Replace the event with an authoritative copy from the server
    pub(crate) fn merge_event(&mut self, mut event: Event) {
        if let Some(participants) = event.participants.as_mut() {
            freizeit_api::types::sort_newest_first(participants);
        }
        self.event = Some(event);
        self.membership_inferred = false;
        self.reconcile_membership();
    }

    /// Re-derive `joined` from the server flag or the participant list
    ///
    /// Called on every user change and every participant merge. When the
    /// server sent no flag, the derived value is written back so that
    /// `joined == is_participant` holds; such a value is re-derived (not
    /// trusted) on the next reconciliation.
    pub(crate) fn reconcile_membership(&mut self) {
        let user_id = self.current_user.as_ref().map(|user| user.id);
        let Some(event) = self.event.as_mut() else {
            return;
        };

        if self.membership_inferred {
            event.is_participant = None;
        }
        let joined = membership::resolve_membership(event, user_id);
        event.joined = joined;

        self.membership_inferred = event.is_participant.is_none() && user_id.is_some();
        if self.membership_inferred {
            event.is_participant = Some(joined);
        }
    }

    /// Drop the server's membership flag, which was computed for the
    /// previous requester, and re-derive it from the participant list
    pub(crate) fn forget_server_membership(&mut self) {
        if let Some(event) = self.event.as_mut() {
            event.is_participant = None;
        }
        self.membership_inferred = false;
        self.reconcile_membership();
    }

    /// Record a local membership change until the server confirms it
    pub(crate) fn set_local_membership(&mut self, joined: bool) {
        if let Some(event) = self.event.as_mut() {
            event.joined = joined;
            event.is_participant = Some(joined);
            self.membership_inferred = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_release_requires_current_generation() {
        let mut guard = ReconciliationGuard::new();
        let first = guard.acquire();
        assert!(guard.release(first));

        let second = guard.acquire();
        let third = guard.acquire();
        assert!(!guard.release(second));
        assert!(guard.is_held());
        assert!(guard.release(third));
        assert!(!guard.is_held());
    }

    #[test]
    fn guard_admits_only_unheld_current_generation() {
        let mut guard = ReconciliationGuard::new();
        let issued = guard.generation();
        assert!(guard.admits(issued));

        let held = guard.acquire();
        assert!(!guard.admits(held));
        assert!(guard.release(held));

        assert!(!guard.admits(issued));
        assert!(guard.admits(held));
    }

    #[test]
    fn prompts_carry_german_texts() {
        assert_eq!(Prompt::EventFull.title(), "Event ausgebucht");
        assert_eq!(Prompt::LoginRequired.title(), "Anmeldung erforderlich");
    }
}
