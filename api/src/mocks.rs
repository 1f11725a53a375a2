//! In-memory events backend for tests and the demo binary.
//!
//! Behaves like the real backend where the event-detail screen can tell the
//! difference: joining is idempotent and capacity is enforced with the
//! backend's error message, location is hidden from non-participants,
//! participants are listed newest first, and leave goes through the
//! participant list. Opaque errors are injected with
//! [`MockEventsApi::fail_next`].

use crate::error::{ApiError, Result};
use crate::provider::EventsApi;
use crate::types::{
    Comment, CommentId, Event, EventId, LeaveOutcome, Participant, ParticipationId, UserId,
    UserSummary, sort_newest_first,
};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Backend operations the mock counts and can fail
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MockCall {
    /// `GET /events/{id}/`
    FetchEvent,
    /// `GET /events/{id}/participants/`
    FetchParticipants,
    /// `POST /events/{id}/participants/`
    Join,
    /// A leave request (list + optional delete)
    Leave,
    /// `DELETE /events/{id}/participants/{participation_id}/`
    DeleteParticipation,
    /// `GET /events/{id}/comments/`
    FetchComments,
    /// `POST /events/{id}/comments/`
    AddComment,
    /// `DELETE /comments/{id}/`
    DeleteComment,
    /// `GET /friends/list/`
    FetchFriends,
}

#[derive(Debug)]
struct Backend {
    events: HashMap<EventId, Event>,
    participants: HashMap<EventId, Vec<Participant>>,
    comments: HashMap<EventId, Vec<Comment>>,
    friends: Vec<UserId>,
    session_user: Option<UserSummary>,
    calls: HashMap<MockCall, usize>,
    failures: HashMap<MockCall, ApiError>,
    latency: Duration,
    omit_participation: bool,
    next_id: u64,
    epoch: DateTime<Utc>,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            events: HashMap::new(),
            participants: HashMap::new(),
            comments: HashMap::new(),
            friends: Vec::new(),
            session_user: None,
            calls: HashMap::new(),
            failures: HashMap::new(),
            latency: Duration::ZERO,
            omit_participation: false,
            next_id: 1000,
            epoch: DateTime::<Utc>::from_timestamp(1_748_779_200, 0).unwrap_or_default(),
        }
    }
}

impl Backend {
    /// Count the call and take an injected failure, if any
    fn record(&mut self, call: MockCall) -> Result<()> {
        *self.calls.entry(call).or_default() += 1;
        self.failures.remove(&call).map_or(Ok(()), Err)
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Monotonic timestamps so "newest first" ordering is deterministic
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let offset = i64::try_from(self.next_id()).unwrap_or(i64::MAX);
        self.epoch + TimeDelta::seconds(offset)
    }

    fn session_user(&self) -> Result<UserSummary> {
        self.session_user.clone().ok_or(ApiError::NotAuthenticated)
    }

    fn event(&self, event_id: EventId) -> Result<&Event> {
        self.events.get(&event_id).ok_or_else(|| ApiError::Rejected {
            status: 404,
            message: "Nicht gefunden.".to_string(),
        })
    }

    fn sorted_participants(&self, event_id: EventId) -> Vec<Participant> {
        let mut participants = self.participants.get(&event_id).cloned().unwrap_or_default();
        sort_newest_first(&mut participants);
        participants
    }

    /// The event as the backend would serialize it for the session user
    fn render_event(&self, event_id: EventId) -> Result<Event> {
        let mut event = self.event(event_id)?.clone();
        let participants = self.sorted_participants(event_id);
        event.participant_count = u32::try_from(participants.len()).unwrap_or(u32::MAX);
        event.comments_count = self
            .comments
            .get(&event_id)
            .map_or(0, |c| u32::try_from(c.len()).unwrap_or(u32::MAX));
        event.joined = false;

        let can_view_location = self.session_user.as_ref().is_some_and(|user| {
            event.created_by.id == user.id || participants.iter().any(|p| p.user.id == user.id)
        });
        event.can_view_location = can_view_location;
        if !can_view_location {
            event.location = None;
            event.contact_info = None;
        }

        if self.omit_participation {
            event.is_participant = None;
            event.participants = None;
            return Ok(event);
        }

        event.is_participant = self
            .session_user
            .as_ref()
            .map(|user| participants.iter().any(|p| p.user.id == user.id));
        event.participants = self.session_user.is_some().then_some(participants);
        Ok(event)
    }
}

/// In-memory [`EventsApi`] implementation
///
/// Clones share the same backend, so a test can keep a handle for
/// assertions while the reducer environment owns another.
#[derive(Clone, Debug, Default)]
pub struct MockEventsApi {
    backend: Arc<Mutex<Backend>>,
}

impl MockEventsApi {
    /// Create an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Backend> {
        self.backend
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Add or replace an event
    pub fn insert_event(&self, event: Event) {
        let mut backend = self.lock();
        backend.participants.entry(event.id).or_default();
        backend.events.insert(event.id, event);
    }

    /// Set the user requests are made as (`None` = logged out)
    pub fn set_session_user(&self, user: Option<UserSummary>) {
        self.lock().session_user = user;
    }

    /// Register another user as participant, bypassing capacity checks
    pub fn add_participant(&self, event_id: EventId, user: UserSummary) -> ParticipationId {
        let mut backend = self.lock();
        let id = ParticipationId(backend.next_id());
        let joined_at = backend.next_timestamp();
        backend
            .participants
            .entry(event_id)
            .or_default()
            .push(Participant { id, joined_at, user });
        id
    }

    /// Set the session user's friend list
    pub fn set_friends(&self, friends: Vec<UserId>) {
        self.lock().friends = friends;
    }

    /// Make the next call of the given kind fail with `error`
    pub fn fail_next(&self, call: MockCall, error: ApiError) {
        self.lock().failures.insert(call, error);
    }

    /// Delay every response by `latency` (uses tokio time)
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// Leave `is_participant` and `participants` out of event responses,
    /// like older backend versions did
    pub fn omit_participation(&self, omit: bool) {
        self.lock().omit_participation = omit;
    }

    /// Number of calls of the given kind so far
    #[must_use]
    pub fn call_count(&self, call: MockCall) -> usize {
        self.lock().calls.get(&call).copied().unwrap_or(0)
    }

    /// Total number of calls of any kind
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().sum()
    }

    /// Server-side participant list of an event, newest first
    #[must_use]
    pub fn participants(&self, event_id: EventId) -> Vec<Participant> {
        self.lock().sorted_participants(event_id)
    }

    /// Whether the user is registered for the event server-side
    #[must_use]
    pub fn is_registered(&self, event_id: EventId, user_id: UserId) -> bool {
        self.lock()
            .participants
            .get(&event_id)
            .is_some_and(|list| list.iter().any(|p| p.user.id == user_id))
    }

    async fn simulate_latency(&self) {
        let latency = self.lock().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

impl EventsApi for MockEventsApi {
    fn fetch_event(&self, event_id: EventId) -> impl Future<Output = Result<Event>> + Send {
        async move {
            self.simulate_latency().await;
            let mut backend = self.lock();
            backend.record(MockCall::FetchEvent)?;
            backend.render_event(event_id)
        }
    }

    fn fetch_participants(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Vec<Participant>>> + Send {
        async move {
            self.simulate_latency().await;
            let mut backend = self.lock();
            backend.record(MockCall::FetchParticipants)?;
            backend.session_user()?;
            backend.event(event_id)?;
            Ok(backend.sorted_participants(event_id))
        }
    }

    fn join_event(&self, event_id: EventId) -> impl Future<Output = Result<()>> + Send {
        async move {
            self.simulate_latency().await;
            let mut backend = self.lock();
            backend.record(MockCall::Join)?;
            let user = backend.session_user()?;
            let max_guests = backend.event(event_id)?.max_guests;
            let current = backend.participants.get(&event_id).cloned().unwrap_or_default();

            // Joining twice returns the existing record
            if current.iter().any(|p| p.user.id == user.id) {
                return Ok(());
            }
            if max_guests.is_some_and(|max| current.len() >= max as usize) {
                return Err(ApiError::Rejected {
                    status: 400,
                    message: "Dieses Event ist bereits voll.".to_string(),
                });
            }

            let id = ParticipationId(backend.next_id());
            let joined_at = backend.next_timestamp();
            backend
                .participants
                .entry(event_id)
                .or_default()
                .push(Participant { id, joined_at, user });
            Ok(())
        }
    }

    fn leave_event(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> impl Future<Output = Result<LeaveOutcome>> + Send {
        async move {
            self.simulate_latency().await;
            let mut backend = self.lock();
            backend.record(MockCall::Leave)?;
            backend.session_user()?;
            backend.event(event_id)?;

            let record = backend
                .participants
                .get(&event_id)
                .and_then(|list| list.iter().find(|p| p.user.id == user_id))
                .map(|p| p.id);
            let Some(participation_id) = record else {
                return Ok(LeaveOutcome::NotParticipant);
            };

            backend.record(MockCall::DeleteParticipation)?;
            if let Some(list) = backend.participants.get_mut(&event_id) {
                list.retain(|p| p.id != participation_id);
            }
            Ok(LeaveOutcome::Removed { participation_id })
        }
    }

    fn fetch_comments(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Vec<Comment>>> + Send {
        async move {
            self.simulate_latency().await;
            let mut backend = self.lock();
            backend.record(MockCall::FetchComments)?;
            Ok(backend.comments.get(&event_id).cloned().unwrap_or_default())
        }
    }

    fn add_comment(
        &self,
        event_id: EventId,
        text: String,
    ) -> impl Future<Output = Result<Comment>> + Send {
        async move {
            self.simulate_latency().await;
            let mut backend = self.lock();
            backend.record(MockCall::AddComment)?;
            let author = backend.session_user()?;
            backend.event(event_id)?;
            if text.trim().is_empty() {
                return Err(ApiError::Rejected {
                    status: 400,
                    message: "Dieses Feld darf nicht leer sein.".to_string(),
                });
            }

            let comment = Comment {
                id: CommentId(backend.next_id()),
                event: event_id,
                author_avatar: author.profile_image.clone(),
                author,
                text,
                created_at: backend.next_timestamp(),
                is_author: true,
                can_delete: true,
            };
            backend
                .comments
                .entry(event_id)
                .or_default()
                .push(comment.clone());
            Ok(comment)
        }
    }

    fn delete_comment(&self, comment_id: CommentId) -> impl Future<Output = Result<()>> + Send {
        async move {
            self.simulate_latency().await;
            let mut backend = self.lock();
            backend.record(MockCall::DeleteComment)?;
            let user = backend.session_user()?;

            let found = backend.comments.values_mut().find_map(|list| {
                list.iter()
                    .position(|c| c.id == comment_id)
                    .map(|index| (list, index))
            });
            match found {
                Some((list, index)) if list[index].author.id == user.id => {
                    list.remove(index);
                    Ok(())
                },
                Some(_) => Err(ApiError::Forbidden),
                None => Err(ApiError::Rejected {
                    status: 404,
                    message: "Nicht gefunden.".to_string(),
                }),
            }
        }
    }

    fn fetch_friend_ids(&self) -> impl Future<Output = Result<Vec<UserId>>> + Send {
        async move {
            self.simulate_latency().await;
            let mut backend = self.lock();
            backend.record(MockCall::FetchFriends)?;
            backend.session_user()?;
            Ok(backend.friends.clone())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can unwrap
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user(id: u64, name: &str) -> UserSummary {
        UserSummary {
            id: UserId(id),
            username: name.to_lowercase(),
            first_name: name.to_string(),
            last_name: String::new(),
            profile_image: None,
        }
    }

    fn event(max_guests: Option<u32>) -> Event {
        Event {
            id: EventId(1),
            title: "Burgfest".to_string(),
            description: String::new(),
            date: Utc.with_ymd_and_hms(2025, 7, 12, 14, 0, 0).unwrap(),
            location: Some("Wartburg".to_string()),
            contact_info: None,
            can_view_location: true,
            max_guests,
            min_age: None,
            created_by: user(1, "Orga"),
            likes_count: 0,
            comments_count: 0,
            participant_count: 0,
            is_participant: None,
            participants: None,
            image_url: None,
            status: "published".to_string(),
            joined: false,
        }
    }

    #[tokio::test]
    async fn join_then_fetch_reports_participation() {
        let api = MockEventsApi::new();
        api.insert_event(event(Some(5)));
        api.set_session_user(Some(user(2, "Mia")));

        api.join_event(EventId(1)).await.unwrap();
        let fetched = api.fetch_event(EventId(1)).await.unwrap();

        assert_eq!(fetched.participant_count, 1);
        assert_eq!(fetched.is_participant, Some(true));
        assert_eq!(api.call_count(MockCall::Join), 1);
    }

    #[tokio::test]
    async fn join_full_event_is_rejected_with_message() {
        let api = MockEventsApi::new();
        api.insert_event(event(Some(1)));
        api.add_participant(EventId(1), user(3, "Tom"));
        api.set_session_user(Some(user(2, "Mia")));

        let error = api.join_event(EventId(1)).await.unwrap_err();

        assert!(!error.is_opaque());
        assert_eq!(error.to_string(), "Dieses Event ist bereits voll.");
        assert!(!api.is_registered(EventId(1), UserId(2)));
    }

    #[tokio::test]
    async fn repeated_join_is_idempotent() {
        let api = MockEventsApi::new();
        api.insert_event(event(Some(1)));
        api.set_session_user(Some(user(2, "Mia")));

        api.join_event(EventId(1)).await.unwrap();
        api.join_event(EventId(1)).await.unwrap();

        assert_eq!(api.participants(EventId(1)).len(), 1);
        assert_eq!(api.call_count(MockCall::Join), 2);
    }

    #[tokio::test]
    async fn location_hidden_until_joined() {
        let api = MockEventsApi::new();
        api.insert_event(event(None));
        api.set_session_user(Some(user(2, "Mia")));

        let before = api.fetch_event(EventId(1)).await.unwrap();
        api.join_event(EventId(1)).await.unwrap();
        let after = api.fetch_event(EventId(1)).await.unwrap();

        assert_eq!(before.location, None);
        assert!(!before.can_view_location);
        assert_eq!(after.location.as_deref(), Some("Wartburg"));
        assert!(after.can_view_location);
    }

    #[tokio::test]
    async fn leave_without_record_issues_no_delete() {
        let api = MockEventsApi::new();
        api.insert_event(event(None));
        api.set_session_user(Some(user(2, "Mia")));

        let outcome = api.leave_event(EventId(1), UserId(2)).await.unwrap();

        assert_eq!(outcome, LeaveOutcome::NotParticipant);
        assert_eq!(api.call_count(MockCall::DeleteParticipation), 0);
    }

    #[tokio::test]
    async fn participants_newest_first() {
        let api = MockEventsApi::new();
        api.insert_event(event(None));
        api.add_participant(EventId(1), user(3, "Tom"));
        api.add_participant(EventId(1), user(4, "Ida"));
        api.set_session_user(Some(user(2, "Mia")));

        let participants = api.fetch_participants(EventId(1)).await.unwrap();

        let names: Vec<_> = participants.iter().map(|p| p.user.username.as_str()).collect();
        assert_eq!(names, vec!["ida", "tom"]);
    }

    #[tokio::test]
    async fn injected_failure_is_consumed() {
        let api = MockEventsApi::new();
        api.insert_event(event(None));
        api.fail_next(
            MockCall::FetchEvent,
            ApiError::Unreachable {
                url: "http://test".to_string(),
                reason: "down".to_string(),
            },
        );

        assert!(api.fetch_event(EventId(1)).await.is_err());
        assert!(api.fetch_event(EventId(1)).await.is_ok());
        assert_eq!(api.call_count(MockCall::FetchEvent), 2);
    }

    #[tokio::test]
    async fn only_author_may_delete_comment() {
        let api = MockEventsApi::new();
        api.insert_event(event(None));
        api.set_session_user(Some(user(2, "Mia")));
        let comment = api
            .add_comment(EventId(1), "Bin dabei!".to_string())
            .await
            .unwrap();

        api.set_session_user(Some(user(3, "Tom")));
        assert_eq!(
            api.delete_comment(comment.id).await,
            Err(ApiError::Forbidden)
        );

        api.set_session_user(Some(user(2, "Mia")));
        api.delete_comment(comment.id).await.unwrap();
        assert!(api.fetch_comments(EventId(1)).await.unwrap().is_empty());
    }
}
