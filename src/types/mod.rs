//! Core data types for breathing sessions.
//!
//! This module defines the data structures used for:
//! - Breathing phases and their audio cues
//! - Session configuration with validation
//! - Countdown updates reported to the presentation layer

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest accepted phase duration (10 minutes).
pub const MAX_PHASE_MS: u64 = 600_000;

/// Largest accepted cycle count.
pub const MAX_CYCLES: u32 = 500;

// ============================================================================
// Phase
// ============================================================================

/// One segment of the breathing pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Breathing in
    #[default]
    Inhale,
    /// Holding with full lungs
    HoldAfterInhale,
    /// Breathing out
    Exhale,
    /// Holding with empty lungs
    HoldAfterExhale,
    /// All cycles finished
    Complete,
}

impl Phase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Inhale => "inhale",
            Phase::HoldAfterInhale => "hold_after_inhale",
            Phase::Exhale => "exhale",
            Phase::HoldAfterExhale => "hold_after_exhale",
            Phase::Complete => "complete",
        }
    }

    /// Returns the instruction shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Inhale => "Breathe in",
            Phase::HoldAfterInhale | Phase::HoldAfterExhale => "Hold",
            Phase::Exhale => "Breathe out",
            Phase::Complete => "Well done",
        }
    }

    /// Returns the cue played when entering this phase.
    ///
    /// Hold phases are silent.
    pub fn cue(&self) -> Option<CueId> {
        match self {
            Phase::Inhale => Some(CueId::Inhale),
            Phase::Exhale => Some(CueId::Exhale),
            Phase::HoldAfterInhale | Phase::HoldAfterExhale | Phase::Complete => None,
        }
    }

    /// Returns true once the session has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Complete)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// CueId
// ============================================================================

/// Audio cues the session can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueId {
    Inhale,
    Exhale,
    Completion,
}

impl CueId {
    /// All cues, in a stable order.
    pub const ALL: [CueId; 3] = [CueId::Inhale, CueId::Exhale, CueId::Completion];

    pub fn as_str(&self) -> &'static str {
        match self {
            CueId::Inhale => "inhale",
            CueId::Exhale => "exhale",
            CueId::Completion => "completion",
        }
    }
}

// ============================================================================
// SessionConfig
// ============================================================================

/// Errors raised when a session configuration is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The session must run at least one cycle.
    #[error("total cycles must be at least 1")]
    NoCycles,

    /// The cycle count exceeds [`MAX_CYCLES`].
    #[error("total cycles must not exceed {MAX_CYCLES} (got {0})")]
    TooManyCycles(u32),

    /// Inhale and exhale cannot be instantaneous.
    #[error("breath duration must be greater than 0 ms")]
    ZeroBreathDuration,

    /// A phase duration exceeds [`MAX_PHASE_MS`].
    #[error("{name} duration must not exceed {MAX_PHASE_MS} ms (got {value} ms)")]
    PhaseTooLong {
        /// Which duration was rejected
        name: &'static str,
        /// The rejected value in milliseconds
        value: u64,
    },
}

/// Timing of a breathing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Duration of the inhale and exhale phases in milliseconds
    pub breath_duration_ms: u64,
    /// Duration of both hold phases in milliseconds
    pub hold_duration_ms: u64,
    /// Number of full inhale/hold/exhale/hold repetitions
    pub total_cycles: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            breath_duration_ms: 4_000,
            hold_duration_ms: 4_000,
            total_cycles: 4,
        }
    }
}

impl SessionConfig {
    /// Creates a configuration from raw millisecond durations.
    pub fn new(breath_duration_ms: u64, hold_duration_ms: u64, total_cycles: u32) -> Self {
        Self {
            breath_duration_ms,
            hold_duration_ms,
            total_cycles,
        }
    }

    /// Returns a copy with a different breath duration.
    pub fn with_breath_ms(mut self, ms: u64) -> Self {
        self.breath_duration_ms = ms;
        self
    }

    /// Returns a copy with a different hold duration.
    pub fn with_hold_ms(mut self, ms: u64) -> Self {
        self.hold_duration_ms = ms;
        self
    }

    /// Returns a copy with a different cycle count.
    pub fn with_cycles(mut self, cycles: u32) -> Self {
        self.total_cycles = cycles;
        self
    }

    /// Validates the configuration.
    ///
    /// A zero hold duration is accepted; hold phases are then entered and
    /// left on the next timer fire.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_cycles == 0 {
            return Err(ConfigError::NoCycles);
        }
        if self.total_cycles > MAX_CYCLES {
            return Err(ConfigError::TooManyCycles(self.total_cycles));
        }
        if self.breath_duration_ms == 0 {
            return Err(ConfigError::ZeroBreathDuration);
        }
        if self.breath_duration_ms > MAX_PHASE_MS {
            return Err(ConfigError::PhaseTooLong {
                name: "breath",
                value: self.breath_duration_ms,
            });
        }
        if self.hold_duration_ms > MAX_PHASE_MS {
            return Err(ConfigError::PhaseTooLong {
                name: "hold",
                value: self.hold_duration_ms,
            });
        }
        Ok(())
    }

    /// Returns how long the given phase lasts.
    pub fn duration_for(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Inhale | Phase::Exhale => Duration::from_millis(self.breath_duration_ms),
            Phase::HoldAfterInhale | Phase::HoldAfterExhale => {
                Duration::from_millis(self.hold_duration_ms)
            }
            Phase::Complete => Duration::ZERO,
        }
    }

    /// Length of one full cycle.
    pub fn cycle_duration(&self) -> Duration {
        Duration::from_millis(2 * (self.breath_duration_ms + self.hold_duration_ms))
    }

    /// Length of the whole session, excluding pre-roll and pauses.
    pub fn total_duration(&self) -> Duration {
        self.cycle_duration() * self.total_cycles
    }
}

// ============================================================================
// Countdown reporting
// ============================================================================

/// Rounds a remaining duration up to whole seconds.
pub fn countdown_seconds(remaining: Duration) -> u32 {
    let nanos = remaining.as_nanos();
    u32::try_from(nanos.div_ceil(1_000_000_000)).unwrap_or(u32::MAX)
}

/// Payload of a phase-changed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseUpdate {
    /// Active phase
    pub phase: Phase,
    /// Whole seconds left in the phase, rounded up
    pub countdown_seconds: u32,
    /// Cycles left including the current one
    pub cycles_remaining: u32,
}

impl PhaseUpdate {
    pub fn new(phase: Phase, countdown_seconds: u32, cycles_remaining: u32) -> Self {
        Self {
            phase,
            countdown_seconds,
            cycles_remaining,
        }
    }
}

/// Read-only view of a session for presentation and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub countdown_seconds: u32,
    pub cycles_remaining: u32,
    /// Pre-roll count while the 3-2-1 countdown is showing
    pub pre_roll: Option<u32>,
    pub is_paused: bool,
    pub is_complete: bool,
    pub is_destroyed: bool,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod phase_tests {
        use super::*;

        #[test]
        fn test_default_is_inhale() {
            assert_eq!(Phase::default(), Phase::Inhale);
        }

        #[test]
        fn test_as_str() {
            assert_eq!(Phase::Inhale.as_str(), "inhale");
            assert_eq!(Phase::HoldAfterInhale.as_str(), "hold_after_inhale");
            assert_eq!(Phase::Exhale.as_str(), "exhale");
            assert_eq!(Phase::HoldAfterExhale.as_str(), "hold_after_exhale");
            assert_eq!(Phase::Complete.as_str(), "complete");
        }

        #[test]
        fn test_only_breath_phases_have_cues() {
            assert_eq!(Phase::Inhale.cue(), Some(CueId::Inhale));
            assert_eq!(Phase::Exhale.cue(), Some(CueId::Exhale));
            assert_eq!(Phase::HoldAfterInhale.cue(), None);
            assert_eq!(Phase::HoldAfterExhale.cue(), None);
            assert_eq!(Phase::Complete.cue(), None);
        }

        #[test]
        fn test_is_terminal() {
            assert!(Phase::Complete.is_terminal());
            assert!(!Phase::Inhale.is_terminal());
            assert!(!Phase::HoldAfterExhale.is_terminal());
        }

        #[test]
        fn test_serialize_deserialize() {
            let json = serde_json::to_string(&Phase::HoldAfterExhale).unwrap();
            assert_eq!(json, "\"hold_after_exhale\"");

            let phase: Phase = serde_json::from_str(&json).unwrap();
            assert_eq!(phase, Phase::HoldAfterExhale);
        }

        #[test]
        fn test_display_matches_as_str() {
            assert_eq!(Phase::Exhale.to_string(), "exhale");
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_default_is_valid() {
            assert!(SessionConfig::default().validate().is_ok());
        }

        #[test]
        fn test_zero_cycles_rejected() {
            let config = SessionConfig::default().with_cycles(0);
            assert_eq!(config.validate(), Err(ConfigError::NoCycles));
        }

        #[test]
        fn test_too_many_cycles_rejected() {
            let config = SessionConfig::default().with_cycles(MAX_CYCLES + 1);
            assert_eq!(
                config.validate(),
                Err(ConfigError::TooManyCycles(MAX_CYCLES + 1))
            );
        }

        #[test]
        fn test_zero_breath_rejected() {
            let config = SessionConfig::default().with_breath_ms(0);
            assert_eq!(config.validate(), Err(ConfigError::ZeroBreathDuration));
        }

        #[test]
        fn test_zero_hold_accepted() {
            let config = SessionConfig::default().with_hold_ms(0);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_overlong_phases_rejected() {
            let config = SessionConfig::default().with_breath_ms(MAX_PHASE_MS + 1);
            assert!(matches!(
                config.validate(),
                Err(ConfigError::PhaseTooLong { name: "breath", .. })
            ));

            let config = SessionConfig::default().with_hold_ms(MAX_PHASE_MS + 1);
            assert!(matches!(
                config.validate(),
                Err(ConfigError::PhaseTooLong { name: "hold", .. })
            ));
        }

        #[test]
        fn test_error_messages() {
            assert!(ConfigError::NoCycles.to_string().contains("at least 1"));
            let err = ConfigError::PhaseTooLong {
                name: "hold",
                value: 700_000,
            };
            assert!(err.to_string().contains("700000"));
        }

        #[test]
        fn test_duration_for() {
            let config = SessionConfig::new(3_000, 1_500, 2);
            assert_eq!(config.duration_for(Phase::Inhale), Duration::from_millis(3_000));
            assert_eq!(config.duration_for(Phase::Exhale), Duration::from_millis(3_000));
            assert_eq!(
                config.duration_for(Phase::HoldAfterInhale),
                Duration::from_millis(1_500)
            );
            assert_eq!(
                config.duration_for(Phase::HoldAfterExhale),
                Duration::from_millis(1_500)
            );
            assert_eq!(config.duration_for(Phase::Complete), Duration::ZERO);
        }

        #[test]
        fn test_total_duration() {
            let config = SessionConfig::new(4_000, 2_000, 3);
            assert_eq!(config.cycle_duration(), Duration::from_secs(12));
            assert_eq!(config.total_duration(), Duration::from_secs(36));
        }

        #[test]
        fn test_negative_values_fail_to_deserialize() {
            let json = r#"{"breath_duration_ms":-1,"hold_duration_ms":0,"total_cycles":1}"#;
            assert!(serde_json::from_str::<SessionConfig>(json).is_err());
        }
    }

    mod countdown_tests {
        use super::*;

        #[test]
        fn test_rounds_up() {
            assert_eq!(countdown_seconds(Duration::from_millis(2_000)), 2);
            assert_eq!(countdown_seconds(Duration::from_millis(1_999)), 2);
            assert_eq!(countdown_seconds(Duration::from_millis(1_001)), 2);
            assert_eq!(countdown_seconds(Duration::from_millis(1_000)), 1);
            assert_eq!(countdown_seconds(Duration::from_millis(1)), 1);
            assert_eq!(countdown_seconds(Duration::ZERO), 0);
        }

        #[test]
        fn test_sub_millisecond_remainder_counts_as_a_second() {
            assert_eq!(countdown_seconds(Duration::from_micros(500)), 1);
        }
    }
}
