//! Built-in breathing presets.

use thiserror::Error;

use crate::types::SessionConfig;

/// Errors from looking up a preset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("unknown pattern '{0}' (run `breathwork patterns` to list them)")]
    Unknown(String),
}

/// A named breathing preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreathPattern {
    /// Identifier used on the command line
    pub name: &'static str,
    /// What the pattern is good for
    pub description: &'static str,
    pub breath_ms: u64,
    pub hold_ms: u64,
    pub cycles: u32,
}

impl BreathPattern {
    /// Session configuration for this preset.
    #[must_use]
    pub fn config(&self) -> SessionConfig {
        SessionConfig::new(self.breath_ms, self.hold_ms, self.cycles)
    }
}

/// Pattern used when nothing else is configured.
pub const DEFAULT_PATTERN: &str = "box";

const PATTERNS: &[BreathPattern] = &[
    BreathPattern {
        name: "box",
        description: "Even four-count box breathing for focus",
        breath_ms: 4_000,
        hold_ms: 4_000,
        cycles: 6,
    },
    BreathPattern {
        name: "calm",
        description: "Short holds to settle the nervous system",
        breath_ms: 4_000,
        hold_ms: 2_000,
        cycles: 8,
    },
    BreathPattern {
        name: "relax",
        description: "Slow breaths for stress relief",
        breath_ms: 5_000,
        hold_ms: 3_000,
        cycles: 6,
    },
    BreathPattern {
        name: "quick",
        description: "A one-minute reset",
        breath_ms: 3_000,
        hold_ms: 1_000,
        cycles: 5,
    },
    BreathPattern {
        name: "deep",
        description: "Long, deep breaths before sleep",
        breath_ms: 6_000,
        hold_ms: 4_000,
        cycles: 5,
    },
];

/// All built-in presets, in display order.
#[must_use]
pub fn builtin_patterns() -> &'static [BreathPattern] {
    PATTERNS
}

/// Finds a preset by name, ignoring case.
///
/// # Errors
///
/// Returns [`PatternError::Unknown`] if no preset has that name.
pub fn find_pattern(name: &str) -> Result<&'static BreathPattern, PatternError> {
    PATTERNS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| PatternError::Unknown(name.to_string()))
}
