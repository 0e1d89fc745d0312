//! Direct-messaging state and the per-conversation refresh loop.
//!
//! SYSTEM CONTEXT
//! ==============
//! The messages view keeps one [`ConversationState`]. Selecting a partner
//! resets the thread and starts a fresh [`crate::poll::Poller`]; the previous
//! poller is dropped, which stops its loop. Responses still in flight for an
//! old partner are rejected by [`ConversationState::apply_history`], so a
//! late reply never overwrites the active thread.

#[cfg(test)]
#[path = "messaging_test.rs"]
mod messaging_test;

use std::cell::RefCell;
use std::future::Future;
use std::time::Duration;

use crate::client::ApiClient;
use crate::poll::{PollToken, repeat};
use crate::transport::Transport;
use crate::types::{Message, User, UserId};

/// Sidebar partners plus the open thread.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConversationState {
    /// Conversation partners, most recent first.
    pub partners: Vec<User>,
    pub active: Option<User>,
    /// Messages with `active`, oldest first.
    pub messages: Vec<Message>,
}

impl ConversationState {
    #[must_use]
    pub fn active_id(&self) -> Option<UserId> {
        self.active.as_ref().map(|u| u.id)
    }

    #[must_use]
    pub fn is_active(&self, partner: UserId) -> bool {
        self.active_id() == Some(partner)
    }

    /// Replace the sidebar list, keeping a selected partner that the server
    /// does not know about yet (no messages exchanged).
    pub fn set_partners(&mut self, partners: Vec<User>) {
        self.partners = partners;
        if let Some(active) = self.active.clone() {
            self.add_partner(active);
        }
    }

    fn add_partner(&mut self, partner: User) {
        if !self.partners.iter().any(|u| u.id == partner.id) {
            self.partners.insert(0, partner);
        }
    }

    /// Open a thread. Returns `false` when `partner` was already active.
    pub fn select(&mut self, partner: User) -> bool {
        if self.is_active(partner.id) {
            return false;
        }
        self.messages.clear();
        self.add_partner(partner.clone());
        self.active = Some(partner);
        true
    }

    pub fn close(&mut self) {
        self.active = None;
        self.messages.clear();
    }

    /// Install a fetched history. Ignored unless `partner` is still active.
    pub fn apply_history(&mut self, partner: UserId, messages: Vec<Message>) -> bool {
        if !self.is_active(partner) {
            return false;
        }
        self.messages = messages;
        true
    }

    /// Append a server-confirmed sent message to the active thread.
    pub fn push_sent(&mut self, partner: UserId, message: Message) -> bool {
        if !self.is_active(partner) {
            return false;
        }
        if !self.messages.iter().any(|m| m.id == message.id) {
            self.messages.push(message);
        }
        true
    }
}

/// Whether `message` was sent by `viewer` (rendered on the outgoing side).
#[must_use]
pub fn is_outgoing(message: &Message, viewer: Option<&User>) -> bool {
    viewer.is_some_and(|u| u.id == message.sender.id)
}

/// Send only non-blank text.
#[must_use]
pub fn is_sendable(draft: &str) -> bool {
    !draft.trim().is_empty()
}

impl<T: Transport> ApiClient<T> {
    /// Fetch the thread with `partner` now and every `interval` until `token`
    /// is cancelled. Failed fetches are skipped; the loop keeps going.
    pub async fn watch_conversation<S, SF, F>(
        &self,
        partner: UserId,
        token: PollToken,
        interval: Duration,
        sleep: S,
        on_messages: F,
    ) where
        S: FnMut(Duration) -> SF,
        SF: Future<Output = ()>,
        F: FnMut(UserId, Vec<Message>),
    {
        let alive = token.clone();
        let alive = &alive;
        let sink = &RefCell::new(on_messages);
        repeat(token, interval, sleep, move || async move {
            match self.messages_with(partner).await {
                Ok(messages) if alive.is_active() => {
                    let mut deliver = sink.borrow_mut();
                    (*deliver)(partner, messages);
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(partner, error = %e, "message refresh failed"),
            }
        })
        .await;
    }
}
