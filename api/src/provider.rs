//! The events API seam.

use crate::error::Result;
use crate::types::{
    Comment, CommentId, Event, EventId, LeaveOutcome, Participant, UserId,
};
use std::future::Future;

/// Events backend operations used by the event-detail screen.
///
/// Implemented by [`ApiClient`](crate::ApiClient) over HTTP and by
/// [`MockEventsApi`](crate::mocks::MockEventsApi) in memory.
pub trait EventsApi: Send + Sync {
    /// Fetch an event by id.
    ///
    /// When a session exists the participant list is loaded as well; a
    /// failure to load it is tolerated and leaves `participants` as the
    /// event endpoint returned it.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the event does not exist.
    fn fetch_event(&self, event_id: EventId) -> impl Future<Output = Result<Event>> + Send;

    /// Fetch the participants of an event, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    fn fetch_participants(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Vec<Participant>>> + Send;

    /// Join an event as the session user.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the join (event full, age
    /// requirement, already joined) or the request fails.
    fn join_event(&self, event_id: EventId) -> impl Future<Output = Result<()>> + Send;

    /// Leave an event.
    ///
    /// Participation records are deleted by record id, so this lists the
    /// participants, finds the record belonging to `user_id` and deletes it.
    /// A user without a record yields [`LeaveOutcome::NotParticipant`] and no
    /// delete is issued.
    ///
    /// # Errors
    ///
    /// Returns error if listing or deleting fails.
    fn leave_event(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> impl Future<Output = Result<LeaveOutcome>> + Send;

    /// Fetch the comments of an event.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    fn fetch_comments(&self, event_id: EventId)
    -> impl Future<Output = Result<Vec<Comment>>> + Send;

    /// Post a comment.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the comment or the request fails.
    fn add_comment(
        &self,
        event_id: EventId,
        text: String,
    ) -> impl Future<Output = Result<Comment>> + Send;

    /// Delete a comment.
    ///
    /// # Errors
    ///
    /// Returns error if the user may not delete it or the request fails.
    fn delete_comment(&self, comment_id: CommentId) -> impl Future<Output = Result<()>> + Send;

    /// Ids of the session user's friends.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    fn fetch_friend_ids(&self) -> impl Future<Output = Result<Vec<UserId>>> + Send;
}
