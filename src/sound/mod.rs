//! Audio cues for breathing sessions.
//!
//! This module provides:
//!
//! - The [`CuePlayer`] capability the session controller plays cues through
//! - A rodio-backed player with configurable cue files
//! - Built-in synthesized tones as a fallback
//! - Silent and mock players
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐
//! │ SessionController  │
//! └─────────┬──────────┘
//!           │ play_cue / stop_all
//!           ▼
//! ┌────────────────────┐     ┌──────────────────┐
//! │     CuePlayer      │────▶│   Cue files      │
//! │  (RodioCuePlayer)  │     ├──────────────────┤
//! │                    │────▶│ Built-in tones   │
//! └────────────────────┘     │  (fallback)      │
//!                            └──────────────────┘
//! ```
//!
//! Playback failures never stop a session; the controller logs them and
//! keeps counting.

mod embedded;
mod error;
mod player;
mod source;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub use embedded::{embedded_duration, embedded_notes, Note, TONE_VOLUME};
pub use error::SoundError;
pub use player::{try_create_player, RodioCuePlayer};
pub use source::{has_supported_extension, CueSources, SoundSource, SUPPORTED_EXTENSIONS};

use crate::types::CueId;

/// Capability to play breathing cues.
pub trait CuePlayer {
    /// Starts playing a cue without blocking.
    ///
    /// # Errors
    ///
    /// Returns an error if playback fails.
    fn play_cue(&self, cue: CueId) -> Result<(), SoundError>;

    /// Silences every cue that is still playing.
    fn stop_all(&self);

    /// Returns true once no cue is audible any more.
    fn is_idle(&self) -> bool {
        true
    }
}

impl CuePlayer for RodioCuePlayer {
    fn play_cue(&self, cue: CueId) -> Result<(), SoundError> {
        RodioCuePlayer::play_cue(self, cue)
    }

    fn stop_all(&self) {
        RodioCuePlayer::stop_all(self)
    }

    fn is_idle(&self) -> bool {
        RodioCuePlayer::is_idle(self)
    }
}

impl<T: CuePlayer + ?Sized> CuePlayer for Arc<T> {
    fn play_cue(&self, cue: CueId) -> Result<(), SoundError> {
        (**self).play_cue(cue)
    }

    fn stop_all(&self) {
        (**self).stop_all()
    }

    fn is_idle(&self) -> bool {
        (**self).is_idle()
    }
}

/// Player used when audio is unavailable or turned off.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentCuePlayer;

impl CuePlayer for SilentCuePlayer {
    fn play_cue(&self, _cue: CueId) -> Result<(), SoundError> {
        Ok(())
    }

    fn stop_all(&self) {}
}

/// Mock cue player for testing.
#[derive(Debug, Default)]
pub struct MockCuePlayer {
    play_calls: Mutex<Vec<CueId>>,
    stop_calls: AtomicUsize,
    should_fail: AtomicBool,
}

impl MockCuePlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.play_calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<CueId> {
        self.play_calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn clear_calls(&self) {
        self.play_calls.lock().unwrap_or_else(|e| e.into_inner()).clear();
        self.stop_calls.store(0, Ordering::SeqCst);
    }
}

impl CuePlayer for MockCuePlayer {
    fn play_cue(&self, cue: CueId) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        self.play_calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(cue);
        Ok(())
    }

    fn stop_all(&self) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
    }
}
