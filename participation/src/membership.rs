//! Participation bookkeeping on a loaded event.
//!
//! The server flag `is_participant` wins whenever it is present; the
//! participant list is only consulted when the flag is missing.

use chrono::{DateTime, Utc};
use freizeit_api::types::sort_newest_first;
use freizeit_api::{Event, Participant, ParticipationId, UserId, UserSummary};

/// Record id used for a locally added participant until the server's copy
/// replaces it
pub const LOCAL_PARTICIPATION_ID: ParticipationId = ParticipationId(0);

/// Whether the user takes part in the event
///
/// Uses `is_participant` when present, otherwise looks the user up in the
/// participant list. Without a user only the server flag counts.
#[must_use]
pub fn resolve_membership(event: &Event, user_id: Option<UserId>) -> bool {
    event
        .is_participant
        .unwrap_or_else(|| user_id.is_some_and(|id| event.has_participant(id)))
}

/// Add the user to the participant list and bump the count
///
/// No-op if the user is already listed.
pub fn add_local_participant(event: &mut Event, user: &UserSummary, joined_at: DateTime<Utc>) {
    if event.has_participant(user.id) {
        return;
    }
    event
        .participants
        .get_or_insert_with(Vec::new)
        .insert(
            0,
            Participant {
                id: LOCAL_PARTICIPATION_ID,
                joined_at,
                user: user.clone(),
            },
        );
    event.participant_count = event.participant_count.saturating_add(1);
}

/// Remove the user from the participant list and decrement the count
///
/// The count never drops below zero.
pub fn remove_local_participant(event: &mut Event, user_id: UserId) {
    if let Some(participants) = event.participants.as_mut() {
        participants.retain(|p| p.user.id != user_id);
    }
    event.participant_count = event.participant_count.saturating_sub(1);
}

/// Merge a freshly fetched participant list
///
/// The participants endpoint leaves out users with private profiles, so the
/// list can be shorter than the event's count. The count only grows here.
pub fn apply_backfill(event: &mut Event, mut participants: Vec<Participant>) {
    sort_newest_first(&mut participants);
    let listed = u32::try_from(participants.len()).unwrap_or(u32::MAX);
    event.participant_count = event.participant_count.max(listed);
    event.participants = Some(participants);
}
