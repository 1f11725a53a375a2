//! Actions of the event-detail screen: user input and effect results.

use freizeit_api::{
    ApiError, Comment, CommentId, Event, LeaveOutcome, Participant, UserId, UserSummary,
};

/// Why an event fetch was issued
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchReason {
    /// First load after mounting
    Initial,
    /// Refresh after the screen regained focus
    Focus,
    /// Refresh after the logged-in user changed
    UserChanged,
    /// Authoritative refetch after a successful join
    AfterJoin,
    /// Authoritative refetch after a successful leave
    AfterLeave,
    /// Refetch after a failed join or leave
    Recovery,
}

impl FetchReason {
    /// Whether the fetch concludes a join or leave
    ///
    /// Such results are always applied and schedule the guard release.
    /// Background results are subject to the guard.
    #[must_use]
    pub const fn concludes_operation(self) -> bool {
        matches!(self, Self::AfterJoin | Self::AfterLeave | Self::Recovery)
    }
}

/// Event-detail actions
#[derive(Clone, Debug, PartialEq)]
pub enum EventDetailAction {
    // ========== Lifecycle ==========
    /// Screen mounted: load event, comments and friends
    Mounted,
    /// Screen regained focus
    Focused,
    /// The focus delay elapsed
    FocusRefreshDue {
        /// Guard generation when the refresh was scheduled
        generation: u64,
    },
    /// The logged-in user became known or changed
    UserChanged {
        /// New user (`None` = logged out)
        user: Option<UserSummary>,
    },

    // ========== Participation ==========
    /// Join button tapped
    JoinTapped,
    /// Leave button tapped
    LeaveTapped,
    /// Join request finished
    JoinResponded {
        /// Generation of the join
        generation: u64,
        /// Backend answer
        result: Result<(), ApiError>,
    },
    /// Leave request finished
    LeaveResponded {
        /// Generation of the leave
        generation: u64,
        /// Backend answer
        result: Result<LeaveOutcome, ApiError>,
    },
    /// Event fetch finished
    EventFetched {
        /// Generation the fetch was issued under
        generation: u64,
        /// Why it was issued
        reason: FetchReason,
        /// Backend answer
        result: Result<Event, ApiError>,
    },
    /// Participant backfill finished
    ParticipantsBackfilled {
        /// Generation the backfill was issued under
        generation: u64,
        /// Backend answer
        result: Result<Vec<Participant>, ApiError>,
    },
    /// The settle delay after an operation elapsed
    SettleElapsed {
        /// Generation to release
        generation: u64,
    },

    // ========== Comments and friends ==========
    /// Comment fetch finished
    CommentsFetched {
        /// Backend answer
        result: Result<Vec<Comment>, ApiError>,
    },
    /// Friend list fetch finished
    FriendsFetched {
        /// Backend answer
        result: Result<Vec<UserId>, ApiError>,
    },
    /// A comment was submitted
    CommentSubmitted {
        /// Comment text
        text: String,
    },
    /// Comment creation finished
    CommentAdded {
        /// Backend answer
        result: Result<Comment, ApiError>,
    },
    /// Delete tapped on a comment
    CommentDeleteTapped {
        /// Comment to delete
        comment_id: CommentId,
    },
    /// Comment deletion finished
    CommentDeleted {
        /// Deleted comment
        comment_id: CommentId,
        /// Backend answer
        result: Result<(), ApiError>,
    },

    // ========== Modals ==========
    /// Alert dismissed
    AlertDismissed,
    /// Prompt dismissed
    PromptDismissed,
}
