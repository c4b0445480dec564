//! Guided breathing sessions.
//!
//! - `controller`: the session state machine
//! - `clock`: time sources
//! - `scheduler`: one-shot timers delivered back to the event loop
//! - `observer`: progress notifications
//! - `manual`: deterministic timer double for tests and simulations

pub mod clock;
pub mod controller;
pub mod manual;
pub mod observer;
pub mod scheduler;

pub use clock::{Clock, ManualClock, TokioClock};
pub use controller::{
    Collaborators, ControllerOptions, SessionController, DEFAULT_PRE_ROLL_SECONDS,
    DEFAULT_RESUME_CUE_THRESHOLD,
};
pub use manual::ManualScheduler;
pub use observer::{NullObserver, SessionEvent, SessionObserver};
pub use scheduler::{TimerScheduler, TimerToken, TokioScheduler};
