//! Cue player implementation using rodio.
//!
//! This module provides the `RodioCuePlayer` which uses the rodio v0.20
//! audio library for cross-platform playback.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rodio::source::SineWave;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, warn};

use super::embedded::{embedded_notes, TONE_VOLUME};
use super::error::SoundError;
use super::source::{has_supported_extension, CueSources, SoundSource};
use crate::types::CueId;

/// A cue player that uses rodio for audio playback.
///
/// Playback is non-blocking. Sinks of cues still playing are kept so that
/// `stop_all` can silence them.
pub struct RodioCuePlayer {
    /// The audio output stream (must be kept alive for playback).
    _stream: OutputStream,
    /// Handle to the output stream for creating sinks.
    stream_handle: OutputStreamHandle,
    /// Where each cue's audio comes from.
    sources: CueSources,
    /// Sinks that may still be playing.
    active: Mutex<Vec<Sink>>,
}

impl RodioCuePlayer {
    /// Creates a new cue player.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new(sources: CueSources) -> Result<Self, SoundError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        debug!("Audio output stream initialized");

        for cue in CueId::ALL {
            if let Some(path) = sources.get(cue).path() {
                if !has_supported_extension(path) {
                    warn!(cue = cue.as_str(), "Unrecognised cue file extension: {}", path.display());
                }
            }
        }

        Ok(Self {
            _stream: stream,
            stream_handle,
            sources,
            active: Mutex::new(Vec::new()),
        })
    }

    fn active(&self) -> MutexGuard<'_, Vec<Sink>> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Plays the cue from its configured source.
    ///
    /// A file that cannot be opened or decoded falls back to the built-in
    /// tone for that cue.
    ///
    /// # Errors
    ///
    /// Returns an error if no sink can be created or the fallback tone
    /// cannot be queued.
    pub fn play_cue(&self, cue: CueId) -> Result<(), SoundError> {
        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| SoundError::StreamError(e.to_string()))?;

        match self.sources.get(cue) {
            SoundSource::File { path, name } => {
                debug!("Playing cue file: {}", name);
                if let Err(e) = Self::append_file(&sink, path) {
                    if !e.should_fallback_to_embedded() {
                        return Err(e);
                    }
                    warn!(
                        "Failed to play cue file '{}': {}, falling back to built-in tone",
                        name, e
                    );
                    Self::append_tone(&sink, cue);
                }
            }
            SoundSource::Embedded { cue } => {
                debug!("Playing built-in tone: {}", cue.as_str());
                Self::append_tone(&sink, *cue);
            }
        }

        let mut active = self.active();
        active.retain(|s| !s.empty());
        active.push(sink);
        Ok(())
    }

    fn append_file(sink: &Sink, path: &Path) -> Result<(), SoundError> {
        let file = File::open(path)
            .map_err(|e| SoundError::FileNotFound(format!("{}: {}", path.display(), e)))?;

        let decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| SoundError::DecodeError(e.to_string()))?;

        sink.append(decoder);
        Ok(())
    }

    fn append_tone(sink: &Sink, cue: CueId) {
        for note in embedded_notes(cue) {
            let tone = SineWave::new(note.frequency_hz)
                .take_duration(note.duration())
                .amplify(TONE_VOLUME);
            sink.append(tone);
        }
    }

    /// Stops every cue that is still playing.
    pub fn stop_all(&self) {
        let mut active = self.active();
        let count = active.len();
        for sink in active.drain(..) {
            sink.stop();
        }
        if count > 0 {
            debug!(count, "Stopped playing cues");
        }
    }

    /// Returns true once every queued cue has finished.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active().iter().all(Sink::empty)
    }
}

impl std::fmt::Debug for RodioCuePlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioCuePlayer")
            .field("sources", &self.sources)
            .field("playing", &self.active().len())
            .finish_non_exhaustive()
    }
}

/// Creates a cue player, returning None if audio is unavailable.
///
/// If audio initialization fails, a warning is logged and None is returned.
#[must_use]
pub fn try_create_player(sources: CueSources) -> Option<RodioCuePlayer> {
    match RodioCuePlayer::new(sources) {
        Ok(player) => Some(player),
        Err(e) => {
            warn!("Audio not available, cues disabled: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests return early in environments without audio hardware
    // (e.g., CI containers).

    #[test]
    fn test_new_player_is_idle() {
        let player = match RodioCuePlayer::new(CueSources::default()) {
            Ok(p) => p,
            Err(_) => return,
        };

        assert!(player.is_idle());
        assert!(player.active().is_empty());
    }

    #[test]
    fn test_playing_cue_is_tracked_until_stopped() {
        let player = match RodioCuePlayer::new(CueSources::default()) {
            Ok(p) => p,
            Err(_) => return,
        };

        if player.play_cue(CueId::Completion).is_err() {
            return;
        }
        assert_eq!(player.active().len(), 1);

        player.stop_all();
        assert!(player.is_idle());
    }

    #[test]
    fn test_missing_file_falls_back_and_stop_all_clears() {
        let sources = CueSources::from_files(Some(Path::new("/nonexistent/inhale.wav")), None, None);
        let player = match RodioCuePlayer::new(sources) {
            Ok(p) => p,
            Err(_) => return,
        };

        assert!(player.play_cue(CueId::Inhale).is_ok());
        player.stop_all();
        assert!(player.active().is_empty());
    }

    #[test]
    fn test_try_create_player_does_not_panic() {
        let _ = try_create_player(CueSources::default());
    }

    #[test]
    fn test_debug_impl() {
        let player = match RodioCuePlayer::new(CueSources::default()) {
            Ok(p) => p,
            Err(_) => return,
        };

        assert!(format!("{:?}", player).contains("RodioCuePlayer"));
    }
}
