//! One-shot timers delivered back to the session's event loop.
//!
//! The controller never sleeps. It asks a [`TimerScheduler`] to deliver a
//! [`TimerToken`] after a delay and is handed that token back through
//! `SessionController::handle_timer`. Every arming uses a fresh token, so a
//! token that fires after it was superseded is recognised as stale.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// Identifies one armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

impl TimerToken {
    #[must_use]
    pub const fn new(generation: u64) -> Self {
        Self(generation)
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.0
    }

    /// Returns the token for the next generation.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Capability to arm and cancel one-shot timers.
pub trait TimerScheduler {
    /// Delivers `token` once `delay` has elapsed.
    fn schedule(&mut self, token: TimerToken, delay: Duration);

    /// Prevents `token` from being delivered, if it is still pending.
    fn cancel(&mut self, token: TimerToken);
}

impl<T: TimerScheduler + ?Sized> TimerScheduler for Box<T> {
    fn schedule(&mut self, token: TimerToken, delay: Duration) {
        (**self).schedule(token, delay);
    }

    fn cancel(&mut self, token: TimerToken) {
        (**self).cancel(token);
    }
}

// ============================================================================
// TokioScheduler
// ============================================================================

/// Scheduler that sleeps on the tokio runtime and sends fired tokens
/// over an unbounded channel.
///
/// Must be used from within a tokio runtime.
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<TimerToken>,
    pending: HashMap<TimerToken, JoinHandle<()>>,
}

impl TokioScheduler {
    /// Creates a scheduler and the receiver its fired tokens arrive on.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerToken>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            tx,
            pending: HashMap::new(),
        };
        (scheduler, rx)
    }

    /// Number of timers that have not fired or been cancelled yet.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.values().filter(|h| !h.is_finished()).count()
    }
}

impl TimerScheduler for TokioScheduler {
    fn schedule(&mut self, token: TimerToken, delay: Duration) {
        self.pending.retain(|_, handle| !handle.is_finished());

        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the event loop has shut down.
            let _ = tx.send(token);
        });

        if let Some(previous) = self.pending.insert(token, handle) {
            previous.abort();
        }
        trace!(generation = token.generation(), ?delay, "timer armed");
    }

    fn cancel(&mut self, token: TimerToken) {
        if let Some(handle) = self.pending.remove(&token) {
            handle.abort();
            trace!(generation = token.generation(), "timer cancelled");
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.pending.drain() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for TokioScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioScheduler")
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}
