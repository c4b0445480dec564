//! Breathwork Library
//!
//! This library provides the core functionality for the breathwork CLI.
//! It includes:
//! - Session controller driving inhale / hold / exhale / hold cycles
//! - Injectable clock, timer and audio capabilities, with test doubles
//! - Audio cue playback with embedded tones and custom files
//! - Built-in breathing patterns and persisted settings
//! - CLI command parsing, display utilities and the terminal event loop

pub mod cli;
pub mod patterns;
pub mod session;
pub mod settings;
pub mod sound;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    countdown_seconds, ConfigError, CueId, Phase, PhaseUpdate, SessionConfig, SessionSnapshot,
};

// Re-export session types
pub use session::{
    Clock, Collaborators, ControllerOptions, ManualClock, ManualScheduler, SessionController,
    SessionEvent, SessionObserver, TimerScheduler, TimerToken, TokioClock, TokioScheduler,
};

// Re-export sound types
pub use sound::{
    try_create_player, CuePlayer, CueSources, MockCuePlayer, RodioCuePlayer, SilentCuePlayer,
    SoundError, SoundSource,
};

// Re-export pattern and settings types
pub use patterns::{builtin_patterns, find_pattern, BreathPattern, PatternError};
pub use settings::{Settings, SettingsError};

