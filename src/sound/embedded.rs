//! Built-in cue tones.
//!
//! Used when no cue file is configured or the configured file cannot be
//! played. Each cue is a short run of sine notes: inhale rises, exhale
//! falls, completion is a three-note chime.

use std::time::Duration;

use crate::types::CueId;

/// One sine note of a built-in cue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub frequency_hz: f32,
    pub duration_ms: u64,
}

impl Note {
    const fn new(frequency_hz: f32, duration_ms: u64) -> Self {
        Self {
            frequency_hz,
            duration_ms,
        }
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Output gain applied to built-in tones.
pub const TONE_VOLUME: f32 = 0.2;

const INHALE_NOTES: &[Note] = &[Note::new(396.0, 180), Note::new(528.0, 260)];
const EXHALE_NOTES: &[Note] = &[Note::new(528.0, 180), Note::new(396.0, 260)];
const COMPLETION_NOTES: &[Note] = &[
    Note::new(528.0, 160),
    Note::new(660.0, 160),
    Note::new(792.0, 400),
];

/// Returns the notes of the built-in tone for a cue.
#[must_use]
pub const fn embedded_notes(cue: CueId) -> &'static [Note] {
    match cue {
        CueId::Inhale => INHALE_NOTES,
        CueId::Exhale => EXHALE_NOTES,
        CueId::Completion => COMPLETION_NOTES,
    }
}

/// Total length of the built-in tone for a cue.
#[must_use]
pub fn embedded_duration(cue: CueId) -> Duration {
    embedded_notes(cue).iter().map(Note::duration).sum()
}
