//! Deterministic timer double for driving a session without sleeping.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::clock::{Clock, ManualClock};
use super::controller::SessionController;
use super::scheduler::{TimerScheduler, TimerToken};

#[derive(Debug, Default)]
struct Inner {
    pending: BTreeMap<TimerToken, Instant>,
    scheduled_total: usize,
    cancelled_total: usize,
}

/// Scheduler that records deadlines against a [`ManualClock`].
///
/// Clones share state: hand one to the controller and keep one to drive
/// time with [`ManualScheduler::advance`].
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    clock: ManualClock,
    inner: Arc<Mutex<Inner>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Tokens that are armed and not yet fired.
    #[must_use]
    pub fn pending_tokens(&self) -> Vec<TimerToken> {
        self.lock().pending.keys().copied().collect()
    }

    /// Number of armed timers.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Total number of `schedule` calls so far.
    #[must_use]
    pub fn scheduled_total(&self) -> usize {
        self.lock().scheduled_total
    }

    /// Total number of `cancel` calls that removed a pending timer.
    #[must_use]
    pub fn cancelled_total(&self) -> usize {
        self.lock().cancelled_total
    }

    /// Time until the earliest pending timer fires.
    #[must_use]
    pub fn next_due_in(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.lock()
            .pending
            .values()
            .min()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    fn pop_due(&self, until: Instant) -> Option<(TimerToken, Instant)> {
        let mut inner = self.lock();
        let (token, deadline) = inner
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= until)
            .min_by_key(|(token, deadline)| (**deadline, **token))
            .map(|(token, deadline)| (*token, *deadline))?;
        inner.pending.remove(&token);
        Some((token, deadline))
    }

    /// Moves time forward by `by`, firing every timer that falls due on the
    /// way in deadline order. The clock is set to each deadline before its
    /// token is handed to the controller.
    pub fn advance(&self, controller: &mut SessionController, by: Duration) {
        let target = self.clock.now() + by;

        while let Some((token, deadline)) = self.pop_due(target) {
            let now = self.clock.now();
            if deadline > now {
                self.clock.advance(deadline - now);
            }
            controller.handle_timer(token);
        }

        let now = self.clock.now();
        if target > now {
            self.clock.advance(target - now);
        }
    }

    /// [`advance`](Self::advance) in whole milliseconds.
    pub fn advance_ms(&self, controller: &mut SessionController, ms: u64) {
        self.advance(controller, Duration::from_millis(ms));
    }

    /// Fires timers until none are pending or `limit` of simulated time has
    /// passed. Returns the simulated time spent.
    pub fn run_until_idle(&self, controller: &mut SessionController, limit: Duration) -> Duration {
        let start = self.clock.now();
        while let Some(due_in) = self.next_due_in() {
            let spent = self.clock.now() - start;
            if spent + due_in > limit {
                break;
            }
            self.advance(controller, due_in);
        }
        self.clock.now() - start
    }
}

impl TimerScheduler for ManualScheduler {
    fn schedule(&mut self, token: TimerToken, delay: Duration) {
        let deadline = self.clock.now() + delay;
        let mut inner = self.lock();
        inner.pending.insert(token, deadline);
        inner.scheduled_total += 1;
    }

    fn cancel(&mut self, token: TimerToken) {
        let mut inner = self.lock();
        if inner.pending.remove(&token).is_some() {
            inner.cancelled_total += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_records_deadline() {
        let clock = ManualClock::new();
        let mut scheduler = ManualScheduler::new(clock.clone());

        scheduler.schedule(TimerToken::new(1), Duration::from_millis(750));

        assert_eq!(scheduler.pending_tokens(), vec![TimerToken::new(1)]);
        assert_eq!(scheduler.next_due_in(), Some(Duration::from_millis(750)));

        clock.advance_ms(500);
        assert_eq!(scheduler.next_due_in(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_cancel_removes_pending() {
        let clock = ManualClock::new();
        let mut scheduler = ManualScheduler::new(clock);

        scheduler.schedule(TimerToken::new(1), Duration::from_secs(1));
        scheduler.cancel(TimerToken::new(1));
        scheduler.cancel(TimerToken::new(1));

        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(scheduler.scheduled_total(), 1);
        assert_eq!(scheduler.cancelled_total(), 1);
        assert_eq!(scheduler.next_due_in(), None);
    }

    #[test]
    fn test_clones_share_pending_timers() {
        let clock = ManualClock::new();
        let scheduler = ManualScheduler::new(clock);
        let mut handle = scheduler.clone();

        handle.schedule(TimerToken::new(4), Duration::from_secs(1));

        assert_eq!(scheduler.pending_tokens(), vec![TimerToken::new(4)]);
    }
}
