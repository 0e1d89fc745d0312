//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Mirrors `api::Session` into a signal. Route guards and user-aware
//! components read it to coordinate login redirects and identity-dependent
//! rendering; the session subscription in `App` keeps it current, including
//! after a forced logout.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use api::{AuthPhase, SessionSnapshot};

use crate::net::types::{User, UserId};

/// Authentication state tracking the current user and loading status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    /// Startup token check still running.
    pub loading: bool,
}

impl AuthState {
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.id)
    }

    #[must_use]
    pub fn is_self(&self, user_id: UserId) -> bool {
        self.user_id() == Some(user_id)
    }
}

impl From<&SessionSnapshot> for AuthState {
    fn from(snapshot: &SessionSnapshot) -> Self {
        Self { user: snapshot.user.clone(), loading: snapshot.phase == AuthPhase::Loading }
    }
}
