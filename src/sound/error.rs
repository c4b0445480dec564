//! Sound system error types.
//!
//! Cue playback is best effort: callers log these errors and carry on
//! without sound.

use thiserror::Error;

/// Errors that can occur while playing a cue.
#[derive(Debug, Error)]
pub enum SoundError {
    /// Audio device is not available (e.g., no speakers connected).
    #[error("audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// Cue file was not found at the configured path.
    #[error("cue file not found: {0}")]
    FileNotFound(String),

    /// Failed to decode the cue file.
    #[error("failed to decode cue file: {0}")]
    DecodeError(String),

    /// Failed to create an output sink.
    #[error("failed to create audio stream: {0}")]
    StreamError(String),

    /// Generic playback error.
    #[error("cue playback failed: {0}")]
    PlaybackError(String),
}

impl SoundError {
    /// Returns true if this error is related to the cue file.
    #[must_use]
    pub fn is_file_error(&self) -> bool {
        matches!(self, Self::FileNotFound(_) | Self::DecodeError(_))
    }

    /// Returns true if playback should fall back to the built-in tone.
    #[must_use]
    pub fn should_fallback_to_embedded(&self) -> bool {
        self.is_file_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SoundError::DeviceNotAvailable("no device".to_string());
        assert_eq!(err.to_string(), "audio device not available: no device");

        let err = SoundError::FileNotFound("/cues/inhale.wav".to_string());
        assert!(err.to_string().contains("/cues/inhale.wav"));

        let err = SoundError::PlaybackError("mock".to_string());
        assert!(err.to_string().contains("mock"));
    }

    #[test]
    fn test_file_errors_fall_back() {
        assert!(SoundError::FileNotFound("x".into()).should_fallback_to_embedded());
        assert!(SoundError::DecodeError("x".into()).should_fallback_to_embedded());
        assert!(!SoundError::StreamError("x".into()).should_fallback_to_embedded());
        assert!(!SoundError::DeviceNotAvailable("x".into()).should_fallback_to_embedded());
    }
}
