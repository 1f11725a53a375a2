//! Session storage (auth token and cached current user)

use crate::types::UserSummary;
use std::sync::{Arc, RwLock};

/// Where the client keeps the session token and the cached current user
///
/// The client clears the session when the backend answers 401 or 403.
pub trait SessionStore: Send + Sync {
    /// Current auth token, if logged in
    fn token(&self) -> Option<String>;

    /// Cached current user, if logged in
    fn current_user(&self) -> Option<UserSummary>;

    /// Store a new session
    fn store(&self, token: String, user: UserSummary);

    /// Forget token and cached user
    fn clear(&self);
}

#[derive(Debug, Default)]
struct Session {
    token: Option<String>,
    user: Option<UserSummary>,
}

/// In-memory session store
///
/// Clones share the same session.
#[derive(Clone, Debug, Default)]
pub struct InMemorySessionStore {
    session: Arc<RwLock<Session>>,
}

impl InMemorySessionStore {
    /// Create an empty (logged out) session store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session store that is already logged in
    #[must_use]
    pub fn logged_in(token: impl Into<String>, user: UserSummary) -> Self {
        let store = Self::new();
        store.store(token.into(), user);
        store
    }
}

impl SessionStore for InMemorySessionStore {
    fn token(&self) -> Option<String> {
        self.session
            .read()
            .ok()
            .and_then(|session| session.token.clone())
    }

    fn current_user(&self) -> Option<UserSummary> {
        self.session
            .read()
            .ok()
            .and_then(|session| session.user.clone())
    }

    fn store(&self, token: String, user: UserSummary) {
        if let Ok(mut session) = self.session.write() {
            session.token = Some(token);
            session.user = Some(user);
        }
    }

    fn clear(&self) {
        if let Ok(mut session) = self.session.write() {
            *session = Session::default();
        }
    }
}
