//! Debounced user search.
//!
//! DESIGN
//! ======
//! Each keystroke takes a ticket from a shared generation counter, waits the
//! quiet period, and only proceeds if no later ticket was issued meanwhile.
//! The sleep is supplied by the caller (`gloo_timers` in the browser,
//! `tokio::time` elsewhere) so this module stays runtime-agnostic.

#[cfg(test)]
#[path = "debounce_test.rs"]
mod debounce_test;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::User;

/// Issues tickets; only the most recent ticket is current.
#[derive(Clone, Debug)]
pub struct Debouncer {
    delay: Duration,
    latest: Arc<AtomicU64>,
}

/// Proof of one debounced call, invalidated by any later ticket.
#[derive(Debug)]
pub struct DebounceTicket {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl DebounceTicket {
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.generation
    }
}

impl Debouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay, latest: Arc::new(AtomicU64::new(0)) }
    }

    #[must_use]
    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Supersede every outstanding ticket and return a new one.
    #[must_use]
    pub fn ticket(&self) -> DebounceTicket {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        DebounceTicket { generation, latest: Arc::clone(&self.latest) }
    }

    /// Invalidate any pending call without starting a new one.
    pub fn cancel(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    /// Wait out the quiet period. Returns `Some(ticket)` when no later call
    /// arrived in the meantime.
    pub async fn settle<S, F>(&self, sleep: S) -> Option<DebounceTicket>
    where
        S: FnOnce(Duration) -> F,
        F: Future<Output = ()>,
    {
        let ticket = self.ticket();
        sleep(self.delay).await;
        ticket.is_current().then_some(ticket)
    }
}

/// Trimmed search term, or `None` for a blank query.
#[must_use]
pub fn search_term(raw: &str) -> Option<&str> {
    let term = raw.trim();
    if term.is_empty() { None } else { Some(term) }
}

/// What a debounced search produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Blank query: hide results, no request sent.
    Cleared,
    /// A later keystroke took over; leave the displayed results alone.
    Superseded,
    Results(Vec<User>),
}

impl<T: Transport> ApiClient<T> {
    /// Search after the quiet period, dropping calls superseded by a later
    /// query either before the request or while it was in flight.
    ///
    /// # Errors
    ///
    /// Propagates request failures of the surviving call.
    pub async fn search_users_debounced<S, F>(
        &self,
        debouncer: &Debouncer,
        query: &str,
        sleep: S,
    ) -> Result<SearchOutcome, ApiError>
    where
        S: FnOnce(Duration) -> F,
        F: Future<Output = ()>,
    {
        let Some(term) = search_term(query) else {
            debouncer.cancel();
            return Ok(SearchOutcome::Cleared);
        };
        let Some(ticket) = debouncer.settle(sleep).await else {
            return Ok(SearchOutcome::Superseded);
        };
        let users = self.search_users(term).await?;
        if !ticket.is_current() {
            return Ok(SearchOutcome::Superseded);
        }
        Ok(SearchOutcome::Results(users))
    }
}
