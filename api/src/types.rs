//! Resource types returned by the Freizeit events backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Create an id from its raw value
            #[must_use]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Event identifier
    EventId
);
numeric_id!(
    /// User identifier
    UserId
);
numeric_id!(
    /// Identifier of a participation record (not the user id)
    ParticipationId
);
numeric_id!(
    /// Comment identifier
    CommentId
);

/// Public summary of a user, embedded in events, participants and comments
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// User id
    pub id: UserId,
    /// Login name
    pub username: String,
    /// First name
    #[serde(default)]
    pub first_name: String,
    /// Last name
    #[serde(default)]
    pub last_name: String,
    /// Avatar URL (may be relative to the media root)
    #[serde(default, alias = "avatar", skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

impl UserSummary {
    /// Full name, falling back to the username when both names are empty
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// A user's participation in an event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ParticipantRecord")]
pub struct Participant {
    /// Participation record id, used to leave the event
    pub id: ParticipationId,
    /// When the user joined
    pub joined_at: DateTime<Utc>,
    /// The participating user
    pub user: UserSummary,
}

/// Participant records arrive nested (`{id, joined_at, user: {...}}`) from the
/// participants endpoint and flat from some list views.
#[derive(Deserialize)]
#[serde(untagged)]
enum ParticipantRecord {
    Nested {
        id: ParticipationId,
        joined_at: DateTime<Utc>,
        user: UserSummary,
    },
    Flat {
        id: ParticipationId,
        #[serde(default)]
        user_id: Option<UserId>,
        username: String,
        #[serde(default)]
        first_name: String,
        #[serde(default)]
        last_name: String,
        #[serde(default)]
        profile_image: Option<String>,
        joined_at: DateTime<Utc>,
    },
}

impl From<ParticipantRecord> for Participant {
    fn from(record: ParticipantRecord) -> Self {
        match record {
            ParticipantRecord::Nested { id, joined_at, user } => Self { id, joined_at, user },
            ParticipantRecord::Flat {
                id,
                user_id,
                username,
                first_name,
                last_name,
                profile_image,
                joined_at,
            } => Self {
                id,
                joined_at,
                user: UserSummary {
                    id: user_id.unwrap_or(UserId(id.0)),
                    username,
                    first_name,
                    last_name,
                    profile_image,
                },
            },
        }
    }
}

/// An event as returned by `GET /events/{id}/`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event id
    pub id: EventId,
    /// Title
    #[serde(default)]
    pub title: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Scheduled start
    pub date: DateTime<Utc>,
    /// Location text; `None` when hidden from the requesting user
    ///
    /// The backend only reveals location and contact details to the creator
    /// and to participants.
    #[serde(default)]
    pub location: Option<String>,
    /// Contact details; `None` when hidden
    #[serde(default)]
    pub contact_info: Option<String>,
    /// Whether the requesting user may see location and contact details
    #[serde(default)]
    pub can_view_location: bool,
    /// Capacity; `None` means unbounded
    #[serde(default)]
    pub max_guests: Option<u32>,
    /// Minimum participant age
    #[serde(default)]
    pub min_age: Option<u32>,
    /// Creator
    pub created_by: UserSummary,
    /// Number of likes
    #[serde(default)]
    pub likes_count: u32,
    /// Number of comments
    #[serde(default)]
    pub comments_count: u32,
    /// Number of participants
    #[serde(default)]
    pub participant_count: u32,
    /// Server-computed participation flag for the requesting user
    #[serde(default)]
    pub is_participant: Option<bool>,
    /// Participant list, when the backend (or a backfill) provided one
    #[serde(default)]
    pub participants: Option<Vec<Participant>>,
    /// Display image
    #[serde(default)]
    pub image_url: Option<String>,
    /// Publication status
    #[serde(default)]
    pub status: String,
    /// Client-derived participation flag
    #[serde(skip)]
    pub joined: bool,
}

impl Event {
    /// Whether the event has reached its capacity
    ///
    /// An event without `max_guests` is never full.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.max_guests
            .is_some_and(|max| self.participant_count >= max)
    }

    /// Participants known locally (empty when none were loaded)
    #[must_use]
    pub fn participant_list(&self) -> &[Participant] {
        self.participants.as_deref().unwrap_or_default()
    }

    /// Whether the participant list contains the user
    #[must_use]
    pub fn has_participant(&self, user_id: UserId) -> bool {
        self.participant_list().iter().any(|p| p.user.id == user_id)
    }

    /// Whether the participant list is missing or empty
    #[must_use]
    pub fn lacks_participants(&self) -> bool {
        self.participant_list().is_empty()
    }
}

/// A comment on an event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment id
    pub id: CommentId,
    /// Event the comment belongs to
    pub event: EventId,
    /// Author
    pub author: UserSummary,
    /// Author avatar URL
    #[serde(default)]
    pub author_avatar: Option<String>,
    /// Comment text
    pub text: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Whether the requesting user wrote it
    #[serde(default)]
    pub is_author: bool,
    /// Whether the requesting user may delete it
    #[serde(default)]
    pub can_delete: bool,
}

/// An accepted friend of the current user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    /// Friend's user id
    pub id: UserId,
    /// Login name
    pub username: String,
    /// First name
    #[serde(default)]
    pub first_name: String,
    /// Last name
    #[serde(default)]
    pub last_name: String,
    /// Avatar URL
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Result of a leave request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The user's participation record was deleted
    Removed {
        /// Deleted record
        participation_id: ParticipationId,
    },
    /// The user had no participation record; nothing was deleted
    NotParticipant,
}

/// List endpoints answer either paginated or as a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListResponse<T> {
    Paginated { results: Vec<T> },
    Bare(Vec<T>),
}

impl<T> ListResponse<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Self::Paginated { results } => results,
            Self::Bare(items) => items,
        }
    }
}

/// Sort participants newest first
pub fn sort_newest_first(participants: &mut [Participant]) {
    participants.sort_by(|a, b| b.joined_at.cmp(&a.joined_at));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can unwrap
mod tests {
    use super::*;
    use serde_json::json;

    fn event_json() -> serde_json::Value {
        json!({
            "id": 12,
            "title": "Stadtlauf",
            "description": "5 km durch die Altstadt",
            "date": "2025-07-01T09:00:00Z",
            "location": "Marktplatz",
            "max_guests": 10,
            "created_by": {"id": 1, "username": "orga", "first_name": "Olga", "last_name": "Orga"},
            "likes_count": 3,
            "comments_count": 0,
            "participant_count": 10,
            "status": "published"
        })
    }

    #[test]
    fn decodes_event_without_participation_fields() {
        let event: Event = serde_json::from_value(event_json()).unwrap();

        assert_eq!(event.id, EventId(12));
        assert_eq!(event.is_participant, None);
        assert!(event.participants.is_none());
        assert!(!event.joined);
        assert!(event.is_full());
    }

    #[test]
    fn decodes_event_with_hidden_location() {
        // Shape sent to anonymous users and logged-in non-participants
        let event: Event = serde_json::from_value(json!({
            "id": 12,
            "title": "Stadtlauf",
            "description": "5 km durch die Altstadt",
            "location": null,
            "date": "2025-07-01T09:00:00Z",
            "image": null,
            "image_url": null,
            "cost": "",
            "contact_info": null,
            "max_guests": null,
            "min_age": null,
            "status": "published",
            "created_by": {"id": 1, "username": "orga", "email": "", "first_name": "Olga", "last_name": "Orga", "date_joined": "2025-01-01T00:00:00Z"},
            "created_at": "2025-05-01T09:00:00Z",
            "updated_at": "2025-05-01T09:00:00Z",
            "published_at": null,
            "participants": [],
            "participant_count": 4,
            "likes_count": 0,
            "comments_count": 0,
            "can_view_location": false,
            "friend_participants_count": 0,
            "is_participant": false
        }))
        .unwrap();

        assert_eq!(event.location, None);
        assert_eq!(event.contact_info, None);
        assert!(!event.can_view_location);
        assert_eq!(event.is_participant, Some(false));
        assert_eq!(event.participant_count, 4);
        assert!(!event.is_full());
    }

    #[test]
    fn unbounded_event_is_never_full() {
        let mut event: Event = serde_json::from_value(event_json()).unwrap();
        event.max_guests = None;
        event.participant_count = 10_000;

        assert!(!event.is_full());
    }

    #[test]
    fn decodes_nested_and_flat_participants() {
        let nested: Participant = serde_json::from_value(json!({
            "id": 70,
            "joined_at": "2025-06-01T10:00:00Z",
            "user": {"id": 5, "username": "mia", "first_name": "Mia", "last_name": "M"}
        }))
        .unwrap();
        let flat: Participant = serde_json::from_value(json!({
            "id": 71,
            "user_id": 6,
            "username": "tom",
            "first_name": "Tom",
            "last_name": "T",
            "joined_at": "2025-06-02T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(nested.id, ParticipationId(70));
        assert_eq!(nested.user.id, UserId(5));
        assert_eq!(flat.id, ParticipationId(71));
        assert_eq!(flat.user.id, UserId(6));
        assert_eq!(flat.user.display_name(), "Tom T");
    }

    #[test]
    fn list_response_accepts_both_shapes() {
        let paginated: ListResponse<u32> =
            serde_json::from_value(json!({"count": 2, "next": null, "results": [1, 2]})).unwrap();
        let bare: ListResponse<u32> = serde_json::from_value(json!([3])).unwrap();

        assert_eq!(paginated.into_vec(), vec![1, 2]);
        assert_eq!(bare.into_vec(), vec![3]);
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let user = UserSummary {
            id: UserId(1),
            username: "anon".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            profile_image: None,
        };

        assert_eq!(user.display_name(), "anon");
    }
}
