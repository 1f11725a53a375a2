//! Reducer logic for the event-detail screen.
//!
//! Join and leave hold the reconciliation guard from the tap until a settle
//! delay after their authoritative refetch. Focus refreshes, initial loads
//! and participant backfills are background work: they are skipped while the
//! guard is held and their results are dropped if a mutation started after
//! they were issued.

use crate::actions::{EventDetailAction, FetchReason};
use crate::environment::EventDetailEnvironment;
use crate::membership;
use crate::messages;
use crate::state::{Alert, EventDetailState, PendingOperation, Prompt};
use freizeit_api::{ApiError, Comment, CommentId, Event, EventId, EventsApi, LeaveOutcome, Participant, UserId, UserSummary};
use freizeit_core::{SmallVec, async_effect, delay, effect::Effect, reducer::Reducer, smallvec};
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, info, warn};

type Effects = SmallVec<[Effect<EventDetailAction>; 4]>;

/// Reducer for the event-detail screen
pub struct EventDetailReducer<A> {
    api: PhantomData<fn() -> A>,
}

impl<A> EventDetailReducer<A> {
    /// Creates a new `EventDetailReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self { api: PhantomData }
    }
}

impl<A> Default for EventDetailReducer<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for EventDetailReducer<A> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for EventDetailReducer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventDetailReducer")
    }
}

impl<A> EventDetailReducer<A>
where
    A: EventsApi + Clone + 'static,
{
    // ========== Effects ==========

    fn fetch_event(
        env: &EventDetailEnvironment<A>,
        event_id: EventId,
        generation: u64,
        reason: FetchReason,
    ) -> Effect<EventDetailAction> {
        let api = env.api.clone();
        async_effect! {
            let result = api.fetch_event(event_id).await;
            Some(EventDetailAction::EventFetched { generation, reason, result })
        }
    }

    fn fetch_comments(env: &EventDetailEnvironment<A>, event_id: EventId) -> Effect<EventDetailAction> {
        let api = env.api.clone();
        async_effect! {
            let result = api.fetch_comments(event_id).await;
            Some(EventDetailAction::CommentsFetched { result })
        }
    }

    fn fetch_friends(env: &EventDetailEnvironment<A>) -> Effect<EventDetailAction> {
        let api = env.api.clone();
        async_effect! {
            let result = api.fetch_friend_ids().await;
            Some(EventDetailAction::FriendsFetched { result })
        }
    }

    fn settle(env: &EventDetailEnvironment<A>, generation: u64) -> Effect<EventDetailAction> {
        delay! {
            duration: env.config.settle_delay(),
            action: EventDetailAction::SettleElapsed { generation }
        }
    }

    /// Fetch the participant list if the loaded event lacks one
    ///
    /// Only with a logged-in user, only while the guard is free, and at most
    /// one at a time.
    fn start_backfill(
        state: &mut EventDetailState,
        env: &EventDetailEnvironment<A>,
    ) -> Option<Effect<EventDetailAction>> {
        if state.backfill_in_flight || state.guard.is_held() || state.current_user.is_none() {
            return None;
        }
        if !state.event.as_ref()?.lacks_participants() {
            return None;
        }

        state.backfill_in_flight = true;
        let generation = state.guard.generation();
        let event_id = state.event_id;
        let api = env.api.clone();
        debug!(%event_id, generation, "Backfilling participant list");

        Some(async_effect! {
            let result = api.fetch_participants(event_id).await;
            Some(EventDetailAction::ParticipantsBackfilled { generation, result })
        })
    }

    // ========== Lifecycle ==========

    fn mounted(state: &mut EventDetailState, env: &EventDetailEnvironment<A>) -> Effects {
        state.loading = true;
        let event_id = state.event_id;

        let mut effects: Effects = smallvec![
            Self::fetch_event(env, event_id, state.guard.generation(), FetchReason::Initial),
            Self::fetch_comments(env, event_id),
        ];
        if state.current_user.is_some() {
            effects.push(Self::fetch_friends(env));
        }
        effects
    }

    fn focused(state: &EventDetailState, env: &EventDetailEnvironment<A>) -> Effects {
        if state.guard.is_held() {
            debug!(event_id = %state.event_id, "Skipping focus refresh: reconciliation in progress");
            return SmallVec::new();
        }
        if state.event.is_none() {
            return SmallVec::new();
        }

        smallvec![delay! {
            duration: env.config.focus_refresh_delay(),
            action: EventDetailAction::FocusRefreshDue {
                generation: state.guard.generation(),
            }
        }]
    }

    fn focus_refresh_due(
        state: &EventDetailState,
        env: &EventDetailEnvironment<A>,
        generation: u64,
    ) -> Effects {
        if !state.guard.admits(generation) {
            debug!(
                event_id = %state.event_id,
                generation,
                current = state.guard.generation(),
                "Skipping focus refresh: mutation started meanwhile"
            );
            return SmallVec::new();
        }

        smallvec![
            Self::fetch_event(env, state.event_id, generation, FetchReason::Focus),
            Self::fetch_comments(env, state.event_id),
        ]
    }

    fn user_changed(
        state: &mut EventDetailState,
        env: &EventDetailEnvironment<A>,
        user: Option<UserSummary>,
    ) -> Effects {
        let changed = state.current_user.as_ref().map(|u| u.id) != user.as_ref().map(|u| u.id);
        let logged_in = user.is_some();
        state.current_user = user;

        let mut effects = Effects::new();
        if !changed {
            state.reconcile_membership();
            effects.extend(Self::start_backfill(state, env));
            return effects;
        }

        state.forget_server_membership();
        if logged_in {
            effects.push(Self::fetch_friends(env));
        } else {
            state.friend_ids.clear();
        }
        if state.event.is_some() && !state.guard.is_held() {
            debug!(event_id = %state.event_id, "User changed; refetching event");
            effects.push(Self::fetch_event(
                env,
                state.event_id,
                state.guard.generation(),
                FetchReason::UserChanged,
            ));
        }
        effects.extend(Self::start_backfill(state, env));
        effects
    }

    // ========== Participation ==========

    fn join_tapped(state: &mut EventDetailState, env: &EventDetailEnvironment<A>) -> Effects {
        if let Some(pending) = state.pending {
            debug!(?pending, "Ignoring join: operation in flight");
            return SmallVec::new();
        }
        if state.current_user.is_none() {
            state.prompt = Some(Prompt::LoginRequired);
            return SmallVec::new();
        }
        let Some(event) = state.event.as_ref() else {
            debug!("Ignoring join: event not loaded");
            return SmallVec::new();
        };
        if event.joined || event.is_participant == Some(true) {
            debug!(event_id = %state.event_id, "Ignoring join: already a participant");
            return SmallVec::new();
        }
        if event.is_full() {
            info!(
                event_id = %state.event_id,
                participant_count = event.participant_count,
                max_guests = ?event.max_guests,
                "Event full; join not sent"
            );
            state.prompt = Some(Prompt::EventFull);
            return SmallVec::new();
        }

        let generation = state.guard.acquire();
        state.pending = Some(PendingOperation::Join);
        state.alert = None;

        let event_id = state.event_id;
        let api = env.api.clone();
        info!(%event_id, generation, "Joining event");

        smallvec![async_effect! {
            let result = api.join_event(event_id).await;
            Some(EventDetailAction::JoinResponded { generation, result })
        }]
    }

    fn join_responded(
        state: &mut EventDetailState,
        env: &EventDetailEnvironment<A>,
        generation: u64,
        result: Result<(), ApiError>,
    ) -> Effects {
        let event_id = state.event_id;
        match result {
            Ok(()) => {
                info!(%event_id, generation, "Joined event");
                let joined_at = env.clock.now();
                if let (Some(event), Some(user)) = (state.event.as_mut(), state.current_user.as_ref()) {
                    membership::add_local_participant(event, user, joined_at);
                }
                state.set_local_membership(true);
                state.alert = Some(Alert::joined());
                smallvec![Self::fetch_event(env, event_id, generation, FetchReason::AfterJoin)]
            },
            Err(error) => {
                warn!(%event_id, generation, %error, "Join failed; refetching event");
                state.alert = Some(Alert::error(messages::clarify_join_error(&error)));
                smallvec![Self::fetch_event(env, event_id, generation, FetchReason::Recovery)]
            },
        }
    }

    fn leave_tapped(state: &mut EventDetailState, env: &EventDetailEnvironment<A>) -> Effects {
        if let Some(pending) = state.pending {
            debug!(?pending, "Ignoring leave: operation in flight");
            return SmallVec::new();
        }
        let Some(user_id) = state.current_user.as_ref().map(|user| user.id) else {
            state.prompt = Some(Prompt::LoginRequired);
            return SmallVec::new();
        };
        if !state.is_joined() {
            debug!(event_id = %state.event_id, "Ignoring leave: not a participant");
            return SmallVec::new();
        }

        let generation = state.guard.acquire();
        state.pending = Some(PendingOperation::Leave);
        state.alert = None;
        if let Some(event) = state.event.as_mut() {
            membership::remove_local_participant(event, user_id);
        }
        state.set_local_membership(false);

        let event_id = state.event_id;
        let api = env.api.clone();
        info!(%event_id, generation, "Leaving event");

        smallvec![async_effect! {
            let result = api.leave_event(event_id, user_id).await;
            Some(EventDetailAction::LeaveResponded { generation, result })
        }]
    }

    fn leave_responded(
        state: &mut EventDetailState,
        env: &EventDetailEnvironment<A>,
        generation: u64,
        result: Result<LeaveOutcome, ApiError>,
    ) -> Effects {
        let event_id = state.event_id;
        match result {
            Ok(outcome) => {
                info!(%event_id, generation, ?outcome, "Left event");
                state.alert = Some(Alert::left());
                smallvec![Self::fetch_event(env, event_id, generation, FetchReason::AfterLeave)]
            },
            Err(error) => {
                warn!(%event_id, generation, %error, "Leave failed; refetching event");
                state.alert = Some(Alert::error(messages::LEAVE_FAILED));
                smallvec![Self::fetch_event(env, event_id, generation, FetchReason::Recovery)]
            },
        }
    }

    fn event_fetched(
        state: &mut EventDetailState,
        env: &EventDetailEnvironment<A>,
        generation: u64,
        reason: FetchReason,
        result: Result<Event, ApiError>,
    ) -> Effects {
        if reason.concludes_operation() {
            match result {
                Ok(event) => state.merge_event(event),
                Err(error) => {
                    warn!(event_id = %state.event_id, ?reason, %error, "Refetch failed; keeping local state");
                },
            }
            state.pending = None;
            return smallvec![Self::settle(env, generation)];
        }

        if reason == FetchReason::Initial {
            state.loading = false;
        }
        if !state.guard.admits(generation) {
            debug!(
                event_id = %state.event_id,
                ?reason,
                generation,
                current = state.guard.generation(),
                "Discarding stale event fetch"
            );
            return SmallVec::new();
        }

        match result {
            Ok(event) => {
                state.merge_event(event);
                Self::start_backfill(state, env).into_iter().collect()
            },
            Err(error) => {
                warn!(event_id = %state.event_id, ?reason, %error, "Event fetch failed");
                if reason == FetchReason::Initial {
                    state.event = None;
                    state.comments.clear();
                }
                SmallVec::new()
            },
        }
    }

    fn participants_backfilled(
        state: &mut EventDetailState,
        generation: u64,
        result: Result<Vec<Participant>, ApiError>,
    ) {
        state.backfill_in_flight = false;
        if !state.guard.admits(generation) {
            debug!(generation, "Discarding participant backfill: mutation started meanwhile");
            return;
        }

        match result {
            Ok(participants) => {
                if let Some(event) = state.event.as_mut() {
                    membership::apply_backfill(event, participants);
                }
                state.reconcile_membership();
            },
            Err(error) => debug!(%error, "Participant backfill failed"),
        }
    }

    fn settle_elapsed(
        state: &mut EventDetailState,
        env: &EventDetailEnvironment<A>,
        generation: u64,
    ) -> Effects {
        if state.guard.release(generation) {
            debug!(generation, "Reconciliation guard released");
            Self::start_backfill(state, env).into_iter().collect()
        } else {
            debug!(
                generation,
                current = state.guard.generation(),
                "Ignoring release of superseded generation"
            );
            SmallVec::new()
        }
    }

    // ========== Comments ==========

    fn comment_submitted(
        state: &mut EventDetailState,
        env: &EventDetailEnvironment<A>,
        text: &str,
    ) -> Effects {
        if state.current_user.is_none() {
            state.prompt = Some(Prompt::LoginRequired);
            return SmallVec::new();
        }
        let text = text.trim().to_string();
        if text.is_empty() {
            return SmallVec::new();
        }

        let event_id = state.event_id;
        let api = env.api.clone();
        smallvec![async_effect! {
            let result = api.add_comment(event_id, text).await;
            Some(EventDetailAction::CommentAdded { result })
        }]
    }

    fn comment_added(state: &mut EventDetailState, result: Result<Comment, ApiError>) {
        match result {
            Ok(comment) => {
                if let Some(event) = state.event.as_mut() {
                    event.comments_count = event.comments_count.saturating_add(1);
                }
                state.comments.push(comment);
            },
            Err(error) => {
                warn!(%error, "Adding comment failed");
                state.alert = Some(Alert::error(messages::comment_error(
                    &error,
                    messages::COMMENT_FAILED,
                )));
            },
        }
    }

    fn comment_delete_tapped(
        state: &mut EventDetailState,
        env: &EventDetailEnvironment<A>,
        comment_id: CommentId,
    ) -> Effects {
        if state.current_user.is_none() {
            state.prompt = Some(Prompt::LoginRequired);
            return SmallVec::new();
        }

        let api = env.api.clone();
        smallvec![async_effect! {
            let result = api.delete_comment(comment_id).await;
            Some(EventDetailAction::CommentDeleted { comment_id, result })
        }]
    }

    fn comment_deleted(
        state: &mut EventDetailState,
        comment_id: CommentId,
        result: Result<(), ApiError>,
    ) {
        match result {
            Ok(()) => {
                let before = state.comments.len();
                state.comments.retain(|c| c.id != comment_id);
                if state.comments.len() < before {
                    if let Some(event) = state.event.as_mut() {
                        event.comments_count = event.comments_count.saturating_sub(1);
                    }
                }
            },
            Err(error) => {
                warn!(%comment_id, %error, "Deleting comment failed");
                state.alert = Some(Alert::error(messages::comment_error(
                    &error,
                    messages::COMMENT_DELETE_FAILED,
                )));
            },
        }
    }

    fn friends_fetched(state: &mut EventDetailState, result: Result<Vec<UserId>, ApiError>) {
        match result {
            Ok(ids) => state.friend_ids = ids,
            Err(error) => {
                debug!(%error, "Friend list unavailable");
                state.friend_ids.clear();
            },
        }
    }
}

impl<A> Reducer for EventDetailReducer<A>
where
    A: EventsApi + Clone + 'static,
{
    type State = EventDetailState;
    type Action = EventDetailAction;
    type Environment = EventDetailEnvironment<A>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Lifecycle ==========
            EventDetailAction::Mounted => Self::mounted(state, env),
            EventDetailAction::Focused => Self::focused(state, env),
            EventDetailAction::FocusRefreshDue { generation } => {
                Self::focus_refresh_due(state, env, generation)
            },
            EventDetailAction::UserChanged { user } => Self::user_changed(state, env, user),

            // ========== Participation ==========
            EventDetailAction::JoinTapped => Self::join_tapped(state, env),
            EventDetailAction::LeaveTapped => Self::leave_tapped(state, env),
            EventDetailAction::JoinResponded { generation, result } => {
                Self::join_responded(state, env, generation, result)
            },
            EventDetailAction::LeaveResponded { generation, result } => {
                Self::leave_responded(state, env, generation, result)
            },
            EventDetailAction::EventFetched {
                generation,
                reason,
                result,
            } => Self::event_fetched(state, env, generation, reason, result),
            EventDetailAction::ParticipantsBackfilled { generation, result } => {
                Self::participants_backfilled(state, generation, result);
                SmallVec::new()
            },
            EventDetailAction::SettleElapsed { generation } => {
                Self::settle_elapsed(state, env, generation)
            },

            // ========== Comments and friends ==========
            EventDetailAction::CommentsFetched { result } => {
                match result {
                    Ok(comments) => state.comments = comments,
                    Err(error) => warn!(%error, "Loading comments failed"),
                }
                SmallVec::new()
            },
            EventDetailAction::FriendsFetched { result } => {
                Self::friends_fetched(state, result);
                SmallVec::new()
            },
            EventDetailAction::CommentSubmitted { text } => {
                Self::comment_submitted(state, env, &text)
            },
            EventDetailAction::CommentAdded { result } => {
                Self::comment_added(state, result);
                SmallVec::new()
            },
            EventDetailAction::CommentDeleteTapped { comment_id } => {
                Self::comment_delete_tapped(state, env, comment_id)
            },
            EventDetailAction::CommentDeleted { comment_id, result } => {
                Self::comment_deleted(state, comment_id, result);
                SmallVec::new()
            },

            // ========== Modals ==========
            EventDetailAction::AlertDismissed => {
                state.alert = None;
                SmallVec::new()
            },
            EventDetailAction::PromptDismissed => {
                state.prompt = None;
                SmallVec::new()
            },
        }
    }
}
