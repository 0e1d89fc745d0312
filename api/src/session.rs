//! Observable session: current user, token pair, and auth phase.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `Session` is created at startup and shared (it is a cheap `Arc`
//! handle) between the request wrapper, which reads and refreshes tokens, and
//! the view tree, which subscribes to re-render on login/logout.
//!
//! State machine:
//! `Loading → Anonymous | Authenticated`, then freely between
//! `Anonymous` and `Authenticated`. Tokens are mirrored into the
//! [`KeyValueStore`] so a reload can restore them.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::store::{ACCESS_TOKEN_KEY, KeyValueStore, REFRESH_TOKEN_KEY};
use crate::types::User;

/// Where the session is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthPhase {
    /// Startup check of stored tokens still in progress.
    #[default]
    Loading,
    Anonymous,
    Authenticated,
}

/// Access/refresh token pair issued by login, registration, or restore.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tokens {
    pub access: String,
    pub refresh: String,
}

/// What subscribers see on every change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: AuthPhase,
    pub user: Option<User>,
}

/// Handle returned by [`Session::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&SessionSnapshot) + Send + Sync>;

#[derive(Default)]
struct SessionState {
    phase: AuthPhase,
    user: Option<User>,
    access: Option<String>,
    refresh: Option<String>,
}

struct SessionInner {
    store: Arc<dyn KeyValueStore>,
    state: Mutex<SessionState>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_listener: AtomicU64,
}

/// Shared session handle.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("Session")
            .field("phase", &state.phase)
            .field("user", &state.user.as_ref().map(|u| u.id))
            .field("has_access", &state.access.is_some())
            .field("has_refresh", &state.refresh.is_some())
            .finish()
    }
}

impl Session {
    /// Create a session in the `Loading` phase, picking up any tokens already
    /// present in `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let state = SessionState {
            phase: AuthPhase::Loading,
            user: None,
            access: store.get(ACCESS_TOKEN_KEY),
            refresh: store.get(REFRESH_TOKEN_KEY),
        };
        Self {
            inner: Arc::new(SessionInner {
                store,
                state: Mutex::new(state),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(1),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        // A poisoned lock only means a listener panicked mid-update; the
        // token fields are still coherent.
        self.inner.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state();
        SessionSnapshot { phase: state.phase, user: state.user.clone() }
    }

    #[must_use]
    pub fn phase(&self) -> AuthPhase {
        self.state().phase
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.state().user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.phase() == AuthPhase::Authenticated
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.state().access.clone()
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.state().refresh.clone()
    }

    /// Register a listener called with the new snapshot after every change.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&SessionSnapshot) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_listener.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut listeners) = self.inner.listeners.lock() {
            listeners.push((id, Arc::new(listener)));
        }
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        if let Ok(mut listeners) = self.inner.listeners.lock() {
            listeners.retain(|(existing, _)| *existing != id);
        }
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        let listeners: Vec<Listener> = match self.inner.listeners.lock() {
            Ok(listeners) => listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
            Err(_) => return,
        };
        for listener in listeners {
            listener(&snapshot);
        }
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.inner.store.set(key, value) {
            tracing::warn!(key, error = %e, "session token not persisted");
        }
    }

    /// Record an explicit login or registration.
    pub fn login(&self, user: User, tokens: Tokens) {
        self.persist(ACCESS_TOKEN_KEY, &tokens.access);
        self.persist(REFRESH_TOKEN_KEY, &tokens.refresh);
        tracing::info!(user_id = user.id, "session authenticated");
        {
            let mut state = self.state();
            state.phase = AuthPhase::Authenticated;
            state.user = Some(user);
            state.access = Some(tokens.access);
            state.refresh = Some(tokens.refresh);
        }
        self.notify();
    }

    /// Explicit logout: clear storage and return to `Anonymous`.
    pub fn logout(&self) {
        tracing::info!("session logged out");
        self.clear_all();
    }

    /// Forced logout after an unrecoverable authorization failure.
    pub fn expire(&self) {
        tracing::warn!("session expired; clearing stored tokens");
        self.clear_all();
    }

    fn clear_all(&self) {
        if let Err(e) = self.inner.store.clear() {
            tracing::warn!(error = %e, "session storage not cleared");
        }
        {
            let mut state = self.state();
            *state = SessionState { phase: AuthPhase::Anonymous, ..SessionState::default() };
        }
        self.notify();
    }

    /// Store an access token obtained with `refresh_used`. The phase and user
    /// are unchanged.
    ///
    /// Returns `false` without touching anything when the session was logged
    /// out or switched to another token pair while the refresh was in flight.
    pub fn replace_access_if(&self, refresh_used: &str, access: &str) -> bool {
        let mut state = self.state();
        if state.phase == AuthPhase::Anonymous || state.refresh.as_deref() != Some(refresh_used) {
            return false;
        }
        self.persist(ACCESS_TOKEN_KEY, access);
        state.access = Some(access.to_owned());
        true
    }

    /// Forced logout, but only while `refresh_used` is still the held
    /// refresh token. A session replaced in the meantime is left alone.
    pub fn expire_if(&self, refresh_used: &str) -> bool {
        if self.state().refresh.as_deref() != Some(refresh_used) {
            return false;
        }
        self.expire();
        true
    }

    /// Finish the startup check with a confirmed identity.
    pub fn restore(&self, user: User) {
        tracing::info!(user_id = user.id, "session restored");
        {
            let mut state = self.state();
            state.phase = AuthPhase::Authenticated;
            state.user = Some(user);
        }
        self.notify();
    }

    /// Finish the startup check without an identity (no token stored).
    pub fn finish_anonymous(&self) {
        self.state().phase = AuthPhase::Anonymous;
        self.notify();
    }

    /// Replace the cached user after a profile edit.
    pub fn update_user(&self, user: User) {
        {
            let mut state = self.state();
            if state.phase != AuthPhase::Authenticated {
                return;
            }
            state.user = Some(user);
        }
        self.notify();
    }
}
