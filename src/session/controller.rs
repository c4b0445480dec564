//! Breathing session state machine.
//!
//! The controller sequences inhale → hold → exhale → hold for the configured
//! number of cycles, preceded by an optional 3-2-1 pre-roll. It owns no
//! threads: time is read from a [`Clock`], timers are armed on a
//! [`TimerScheduler`], and fired timers are handed back through
//! [`SessionController::handle_timer`].
//!
//! Countdown values are always recomputed from elapsed wall-clock time, so a
//! late timer never accumulates drift.

use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use super::clock::Clock;
use super::observer::SessionObserver;
use super::scheduler::{TimerScheduler, TimerToken};
use crate::sound::CuePlayer;
use crate::types::{
    countdown_seconds, ConfigError, CueId, Phase, PhaseUpdate, SessionConfig, SessionSnapshot,
};

/// Default length of the pre-roll countdown.
pub const DEFAULT_PRE_ROLL_SECONDS: u32 = 3;

/// Default window after a phase starts in which resuming replays its cue.
pub const DEFAULT_RESUME_CUE_THRESHOLD: Duration = Duration::from_millis(1_000);

const SECOND: Duration = Duration::from_secs(1);

// ============================================================================
// Options and collaborators
// ============================================================================

/// Tunables that are not part of the breathing pattern itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Pre-roll count to start from; 0 skips the pre-roll.
    pub pre_roll_seconds: u32,
    /// Resuming with less than this much of the phase elapsed replays the
    /// phase's cue, since pausing cut it off.
    pub resume_cue_threshold: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            pre_roll_seconds: DEFAULT_PRE_ROLL_SECONDS,
            resume_cue_threshold: DEFAULT_RESUME_CUE_THRESHOLD,
        }
    }
}

impl ControllerOptions {
    /// Options with the pre-roll turned off.
    #[must_use]
    pub fn without_pre_roll() -> Self {
        Self {
            pre_roll_seconds: 0,
            ..Self::default()
        }
    }
}

/// Everything the controller talks to.
pub struct Collaborators {
    pub clock: Box<dyn Clock>,
    pub scheduler: Box<dyn TimerScheduler>,
    pub cues: Box<dyn CuePlayer>,
    pub observer: Box<dyn SessionObserver>,
}

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Constructed, `start` not yet called
    Idle,
    /// Counting down before the first inhale
    PreRoll { count: u32 },
    /// Breathing phases
    Breathing,
    /// All cycles done
    Complete,
}

#[derive(Debug)]
struct SessionState {
    stage: Stage,
    phase: Phase,
    cycles_remaining: u32,
    countdown_seconds: u32,
    phase_started_at: Option<Instant>,
    /// Elapsed time in the current phase, kept while paused
    frozen_elapsed: Option<Duration>,
    is_paused: bool,
    destroyed: bool,
}

// ============================================================================
// SessionController
// ============================================================================

/// Drives one guided breathing session.
pub struct SessionController {
    config: SessionConfig,
    options: ControllerOptions,
    clock: Box<dyn Clock>,
    scheduler: Box<dyn TimerScheduler>,
    cues: Box<dyn CuePlayer>,
    observer: Box<dyn SessionObserver>,
    state: SessionState,
    /// Token of the armed timer, if any
    armed: Option<TimerToken>,
    /// Last token handed out
    generation: TimerToken,
}

impl SessionController {
    /// Creates a controller for the given configuration.
    ///
    /// Nothing happens until [`start`](Self::start) is called.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is invalid.
    pub fn new(
        config: SessionConfig,
        options: ControllerOptions,
        collaborators: Collaborators,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let Collaborators {
            clock,
            scheduler,
            cues,
            observer,
        } = collaborators;

        Ok(Self {
            config,
            options,
            clock,
            scheduler,
            cues,
            observer,
            state: SessionState {
                stage: Stage::Idle,
                phase: Phase::Inhale,
                cycles_remaining: config.total_cycles,
                countdown_seconds: countdown_seconds(config.duration_for(Phase::Inhale)),
                phase_started_at: None,
                frozen_elapsed: None,
                is_paused: false,
                destroyed: false,
            },
            armed: None,
            generation: TimerToken::new(0),
        })
    }

    /// Starts the session: the pre-roll if enabled, otherwise the first
    /// inhale. Calling it again has no effect.
    pub fn start(&mut self) {
        if self.state.destroyed || self.state.stage != Stage::Idle {
            debug!("start ignored, session already started");
            return;
        }

        debug!(
            breath_ms = self.config.breath_duration_ms,
            hold_ms = self.config.hold_duration_ms,
            cycles = self.config.total_cycles,
            "Breathing session started"
        );

        if self.options.pre_roll_seconds > 0 {
            self.start_pre_roll(self.options.pre_roll_seconds);
        } else {
            self.enter_phase(Phase::Inhale);
        }
    }

    /// Handles a fired timer.
    ///
    /// Tokens other than the one currently armed are stale and ignored, as
    /// is everything after [`destroy`](Self::destroy).
    pub fn handle_timer(&mut self, token: TimerToken) {
        if self.state.destroyed {
            trace!(generation = token.generation(), "timer after destroy ignored");
            return;
        }
        if self.armed != Some(token) {
            trace!(generation = token.generation(), "stale timer ignored");
            return;
        }
        self.armed = None;

        match self.state.stage {
            Stage::PreRoll { count } => self.pre_roll_tick(count),
            Stage::Breathing => self.phase_tick(),
            Stage::Idle | Stage::Complete => {}
        }
    }

    /// Pauses the session. No-op unless it is running.
    pub fn pause(&mut self) {
        if self.state.destroyed || self.state.is_paused {
            return;
        }

        match self.state.stage {
            Stage::PreRoll { count } => {
                debug!(count, "Paused during pre-roll");
            }
            Stage::Breathing => {
                let duration = self.config.duration_for(self.state.phase);
                let elapsed = self.elapsed_in_phase().min(duration);
                self.state.frozen_elapsed = Some(elapsed);
                self.state.countdown_seconds = countdown_seconds(duration - elapsed);
                debug!(phase = %self.state.phase, ?elapsed, "Paused");
            }
            Stage::Idle | Stage::Complete => return,
        }

        self.cancel_timer();
        self.cues.stop_all();
        self.state.is_paused = true;
        self.observer.on_paused();
    }

    /// Resumes a paused session. No-op unless paused.
    pub fn resume(&mut self) {
        if self.state.destroyed || !self.state.is_paused {
            return;
        }
        self.state.is_paused = false;

        match self.state.stage {
            Stage::PreRoll { count } => {
                debug!(count, "Resumed pre-roll");
                self.observer.on_resumed(None);
                self.arm_timer(SECOND);
            }
            Stage::Breathing => {
                let frozen = self.state.frozen_elapsed.take().unwrap_or_default();
                let now = self.clock.now();
                self.state.phase_started_at = Some(now.checked_sub(frozen).unwrap_or(now));

                let remaining = self.config.duration_for(self.state.phase).saturating_sub(frozen);
                self.state.countdown_seconds = countdown_seconds(remaining);

                if frozen < self.options.resume_cue_threshold && !remaining.is_zero() {
                    if let Some(cue) = self.state.phase.cue() {
                        debug!(cue = cue.as_str(), "Replaying cue on resume near phase start");
                        self.play(cue);
                    }
                }

                debug!(phase = %self.state.phase, ?remaining, "Resumed");
                let update = self.phase_update();
                self.observer.on_resumed(Some(update));
                self.arm_timer(next_tick_delay(remaining));
            }
            Stage::Idle | Stage::Complete => {}
        }
    }

    /// Tears the session down: cancels timers and silences audio.
    ///
    /// Safe to call any number of times from any state. After it returns no
    /// collaborator is called again.
    pub fn destroy(&mut self) {
        if self.state.destroyed {
            return;
        }
        self.cancel_timer();
        self.cues.stop_all();
        self.state.destroyed = true;
        debug!("Breathing session destroyed");
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.state.phase,
            countdown_seconds: self.current_countdown(),
            cycles_remaining: self.state.cycles_remaining,
            pre_roll: match self.state.stage {
                Stage::PreRoll { count } => Some(count),
                _ => None,
            },
            is_paused: self.state.is_paused,
            is_complete: self.state.phase.is_terminal(),
            is_destroyed: self.state.destroyed,
        }
    }

    /// The configuration this session runs.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state.is_paused
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.phase.is_terminal()
    }

    /// Returns true once no cue is audible.
    #[must_use]
    pub fn is_audio_idle(&self) -> bool {
        self.cues.is_idle()
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.state.destroyed
    }

    // ------------------------------------------------------------------------
    // Pre-roll
    // ------------------------------------------------------------------------

    fn start_pre_roll(&mut self, count: u32) {
        self.state.stage = Stage::PreRoll { count };
        self.observer.on_pre_roll(count);
        self.arm_timer(SECOND);
    }

    fn pre_roll_tick(&mut self, count: u32) {
        let next = count.saturating_sub(1);
        if next == 0 {
            self.enter_phase(Phase::Inhale);
        } else {
            self.start_pre_roll(next);
        }
    }

    // ------------------------------------------------------------------------
    // Phases
    // ------------------------------------------------------------------------

    fn enter_phase(&mut self, phase: Phase) {
        let duration = self.config.duration_for(phase);

        self.state.stage = Stage::Breathing;
        self.state.phase = phase;
        self.state.phase_started_at = Some(self.clock.now());
        self.state.frozen_elapsed = None;
        self.state.countdown_seconds = countdown_seconds(duration);

        debug!(
            %phase,
            countdown = self.state.countdown_seconds,
            cycles_remaining = self.state.cycles_remaining,
            "Entered phase"
        );

        if let Some(cue) = phase.cue() {
            self.play(cue);
        }
        let update = self.phase_update();
        self.observer.on_phase_changed(update);
        self.arm_timer(next_tick_delay(duration));
    }

    fn phase_tick(&mut self) {
        let remaining = self.remaining_in_phase();
        if remaining.is_zero() {
            self.advance_phase();
            return;
        }

        let countdown = countdown_seconds(remaining);
        if countdown != self.state.countdown_seconds {
            self.state.countdown_seconds = countdown;
            let update = self.phase_update();
            self.observer.on_phase_changed(update);
        }
        self.arm_timer(next_tick_delay(remaining));
    }

    fn advance_phase(&mut self) {
        let next = match self.state.phase {
            Phase::Inhale => Phase::HoldAfterInhale,
            Phase::HoldAfterInhale => Phase::Exhale,
            Phase::Exhale => Phase::HoldAfterExhale,
            Phase::HoldAfterExhale if self.state.cycles_remaining > 1 => {
                self.state.cycles_remaining -= 1;
                Phase::Inhale
            }
            Phase::HoldAfterExhale | Phase::Complete => {
                self.complete();
                return;
            }
        };
        self.enter_phase(next);
    }

    fn complete(&mut self) {
        self.cancel_timer();
        self.state.stage = Stage::Complete;
        self.state.phase = Phase::Complete;
        self.state.cycles_remaining = 0;
        self.state.countdown_seconds = 0;
        self.state.phase_started_at = None;

        debug!("Breathing session complete");
        self.play(CueId::Completion);
        self.observer.on_session_complete();
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn elapsed_in_phase(&self) -> Duration {
        match (self.state.frozen_elapsed, self.state.phase_started_at) {
            (Some(frozen), _) => frozen,
            (None, Some(started)) => self.clock.now().saturating_duration_since(started),
            (None, None) => Duration::ZERO,
        }
    }

    fn remaining_in_phase(&self) -> Duration {
        self.config
            .duration_for(self.state.phase)
            .saturating_sub(self.elapsed_in_phase())
    }

    fn current_countdown(&self) -> u32 {
        match self.state.stage {
            Stage::Breathing if !self.state.is_paused && !self.state.destroyed => {
                countdown_seconds(self.remaining_in_phase())
            }
            _ => self.state.countdown_seconds,
        }
    }

    fn phase_update(&self) -> PhaseUpdate {
        PhaseUpdate::new(
            self.state.phase,
            self.state.countdown_seconds,
            self.state.cycles_remaining,
        )
    }

    fn play(&self, cue: CueId) {
        if let Err(e) = self.cues.play_cue(cue) {
            warn!(cue = cue.as_str(), "Cue playback failed, continuing without sound: {}", e);
        }
    }

    fn arm_timer(&mut self, delay: Duration) {
        self.cancel_timer();
        self.generation = self.generation.next();
        self.armed = Some(self.generation);
        self.scheduler.schedule(self.generation, delay);
    }

    fn cancel_timer(&mut self) {
        if let Some(token) = self.armed.take() {
            self.scheduler.cancel(token);
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("config", &self.config)
            .field("options", &self.options)
            .field("state", &self.state)
            .field("armed", &self.armed)
            .finish_non_exhaustive()
    }
}

/// Delay until the countdown next changes: the sub-second remainder, or a
/// full second when `remaining` is a whole number of seconds.
fn next_tick_delay(remaining: Duration) -> Duration {
    let sub_second = Duration::from_nanos((remaining.as_nanos() % SECOND.as_nanos()) as u64);
    if sub_second.is_zero() && !remaining.is_zero() {
        SECOND
    } else {
        sub_second
    }
}

// ============================================================================
// Tests
// ============================================================================
