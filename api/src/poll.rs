//! Cancellable repeating task.
//!
//! A [`Poller`] owns a liveness flag; [`repeat`] runs a tick immediately and
//! then after every interval until the flag drops. Dropping the poller
//! cancels it, so binding one to a view's lifetime tears the loop down with
//! the view.

#[cfg(test)]
#[path = "poll_test.rs"]
mod poll_test;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Owner side of a polling loop.
#[derive(Debug)]
pub struct Poller {
    alive: Arc<AtomicBool>,
}

/// Loop side of a polling loop; observes cancellation.
#[derive(Clone, Debug)]
pub struct PollToken {
    alive: Arc<AtomicBool>,
}

impl PollToken {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }
}

impl Poller {
    #[must_use]
    pub fn new() -> Self {
        Self { alive: Arc::new(AtomicBool::new(true)) }
    }

    #[must_use]
    pub fn token(&self) -> PollToken {
        PollToken { alive: Arc::clone(&self.alive) }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.alive.store(false, Ordering::Relaxed);
    }
}

impl Default for Poller {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Run `tick` now and then once per `interval` while `token` is active.
pub async fn repeat<S, SF, K, KF>(token: PollToken, interval: Duration, mut sleep: S, mut tick: K)
where
    S: FnMut(Duration) -> SF,
    SF: Future<Output = ()>,
    K: FnMut() -> KF,
    KF: Future<Output = ()>,
{
    while token.is_active() {
        tick().await;
        sleep(interval).await;
    }
}
