//! Notifications from the session controller to its presentation layer.

use tokio::sync::mpsc;
use tracing::trace;

use crate::types::PhaseUpdate;

/// Receives session progress.
///
/// Every method is invoked synchronously from inside the controller, so
/// implementations must not call back into it.
pub trait SessionObserver {
    /// A pre-roll count is showing (3, 2, 1).
    fn on_pre_roll(&mut self, _count: u32) {}

    /// Fired on every phase entry and on every one-second countdown change.
    fn on_phase_changed(&mut self, update: PhaseUpdate);

    /// Fired exactly once, after the last cycle.
    fn on_session_complete(&mut self);

    /// The session was paused.
    fn on_paused(&mut self) {}

    /// The session was resumed with the given countdown.
    ///
    /// `None` while the pre-roll is still showing.
    fn on_resumed(&mut self, _update: Option<PhaseUpdate>) {}
}

/// Session notifications as values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    PreRoll {
        /// Count being shown
        count: u32,
    },
    PhaseChanged(PhaseUpdate),
    Paused,
    Resumed(Option<PhaseUpdate>),
    Completed,
}

impl SessionEvent {
    /// Returns the phase update if this is a phase change.
    #[must_use]
    pub fn as_phase_update(&self) -> Option<PhaseUpdate> {
        match self {
            Self::PhaseChanged(update) => Some(*update),
            _ => None,
        }
    }
}

/// Forwards notifications into a channel.
impl SessionObserver for mpsc::UnboundedSender<SessionEvent> {
    fn on_pre_roll(&mut self, count: u32) {
        forward(self, SessionEvent::PreRoll { count });
    }

    fn on_phase_changed(&mut self, update: PhaseUpdate) {
        forward(self, SessionEvent::PhaseChanged(update));
    }

    fn on_session_complete(&mut self) {
        forward(self, SessionEvent::Completed);
    }

    fn on_paused(&mut self) {
        forward(self, SessionEvent::Paused);
    }

    fn on_resumed(&mut self, update: Option<PhaseUpdate>) {
        forward(self, SessionEvent::Resumed(update));
    }
}

fn forward(tx: &mpsc::UnboundedSender<SessionEvent>, event: SessionEvent) {
    if tx.send(event).is_err() {
        trace!(?event, "observer channel closed, dropping event");
    }
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SessionObserver for NullObserver {
    fn on_phase_changed(&mut self, _update: PhaseUpdate) {}

    fn on_session_complete(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Phase;

    #[test]
    fn test_channel_observer_forwards_events() {
        let (mut tx, mut rx) = mpsc::unbounded_channel();
        let update = PhaseUpdate::new(Phase::Inhale, 4, 2);

        tx.on_pre_roll(3);
        tx.on_phase_changed(update);
        tx.on_paused();
        tx.on_resumed(Some(update));
        tx.on_session_complete();

        assert_eq!(rx.try_recv().unwrap(), SessionEvent::PreRoll { count: 3 });
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::PhaseChanged(update));
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::Paused);
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::Resumed(Some(update)));
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::Completed);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (mut tx, rx) = mpsc::unbounded_channel::<SessionEvent>();
        drop(rx);

        tx.on_session_complete();
    }

    #[test]
    fn test_as_phase_update() {
        let update = PhaseUpdate::new(Phase::Exhale, 1, 1);
        assert_eq!(
            SessionEvent::PhaseChanged(update).as_phase_update(),
            Some(update)
        );
        assert_eq!(SessionEvent::Completed.as_phase_update(), None);
    }
}
