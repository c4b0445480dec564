//! Event loop that hosts a session in the terminal.
//!
//! The controller is single-threaded: timer tokens, user commands and the
//! ctrl-c signal all arrive as channel messages and are applied one at a
//! time from a single `select!` loop.

use std::io::BufRead;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::session::{SessionController, SessionEvent, TimerToken};

// ============================================================================
// Commands
// ============================================================================

/// Keyboard commands accepted while a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    TogglePause,
    Pause,
    Resume,
    Quit,
}

/// Parses one line of terminal input.
///
/// An empty line toggles pause, which makes Enter the pause key.
#[must_use]
pub fn parse_command(line: &str) -> Option<UserCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "p" | "pause" => Some(UserCommand::TogglePause),
        "r" | "resume" => Some(UserCommand::Resume),
        "q" | "quit" | "exit" => Some(UserCommand::Quit),
        _ => None,
    }
}

/// Reads commands from stdin on a dedicated thread.
///
/// The thread is detached; it ends at EOF or when the receiver is gone.
pub fn spawn_stdin_commands(tx: mpsc::UnboundedSender<UserCommand>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            };
            match parse_command(&line) {
                Some(command) => {
                    if tx.send(command).is_err() {
                        break;
                    }
                }
                None => debug!(input = %line.trim(), "Ignoring unknown input"),
            }
        }
    });
}

/// Sends [`UserCommand::Quit`] on ctrl-c.
pub fn spawn_ctrl_c(tx: mpsc::UnboundedSender<UserCommand>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(UserCommand::Quit);
        }
    });
}

// ============================================================================
// Runner
// ============================================================================

/// How a session run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every cycle finished
    Completed {
        /// Wall time including pauses
        elapsed: Duration,
    },
    /// The user stopped early
    Quit { cycles_completed: u32 },
}

/// Runs a session until it completes or the user quits.
///
/// `events` must be the receiving end of the controller's observer channel
/// and `timers` the receiving end of its scheduler. Every event is passed
/// to `on_event` in order. After completion the final cue is allowed to
/// finish. The controller is destroyed before returning.
pub async fn run_session<F>(
    controller: &mut SessionController,
    mut timers: mpsc::UnboundedReceiver<TimerToken>,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
    mut commands: mpsc::UnboundedReceiver<UserCommand>,
    mut on_event: F,
) -> RunOutcome
where
    F: FnMut(&SessionEvent),
{
    let started_at = Instant::now();
    let mut commands_open = true;

    controller.start();

    loop {
        if drain_events(&mut events, &mut on_event) {
            let elapsed = started_at.elapsed();
            tokio::select! {
                _ = wait_for_audio(controller) => {}
                Some(UserCommand::Quit) = commands.recv(), if commands_open => {
                    debug!("Quit while the completion cue was playing");
                }
            }
            controller.destroy();
            return RunOutcome::Completed { elapsed };
        }

        tokio::select! {
            Some(token) = timers.recv() => {
                controller.handle_timer(token);
            }
            command = commands.recv(), if commands_open => match command {
                Some(UserCommand::TogglePause) if controller.is_paused() => controller.resume(),
                Some(UserCommand::TogglePause) | Some(UserCommand::Pause) => controller.pause(),
                Some(UserCommand::Resume) => controller.resume(),
                Some(UserCommand::Quit) => {
                    debug!("Quit requested");
                    return quit(controller, &mut events, &mut on_event);
                }
                None => {
                    debug!("Command input closed");
                    commands_open = false;
                }
            },
            else => {
                warn!("Timer channel closed before the session finished");
                return quit(controller, &mut events, &mut on_event);
            }
        }
    }
}

/// Longest wait for the completion cue before tearing down.
pub const COMPLETION_CUE_TIMEOUT: Duration = Duration::from_secs(10);

const AUDIO_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Waits until the controller's cues have finished, up to
/// [`COMPLETION_CUE_TIMEOUT`].
async fn wait_for_audio(controller: &SessionController) {
    let deadline = Instant::now() + COMPLETION_CUE_TIMEOUT;
    while !controller.is_audio_idle() && Instant::now() < deadline {
        tokio::time::sleep(AUDIO_POLL_INTERVAL).await;
    }
}

/// Passes queued events to `on_event`. Returns true once completion is seen.
fn drain_events<F>(events: &mut mpsc::UnboundedReceiver<SessionEvent>, on_event: &mut F) -> bool
where
    F: FnMut(&SessionEvent),
{
    while let Ok(event) = events.try_recv() {
        on_event(&event);
        if event == SessionEvent::Completed {
            return true;
        }
    }
    false
}

fn quit<F>(
    controller: &mut SessionController,
    events: &mut mpsc::UnboundedReceiver<SessionEvent>,
    on_event: &mut F,
) -> RunOutcome
where
    F: FnMut(&SessionEvent),
{
    controller.destroy();
    drain_events(events, on_event);

    let snapshot = controller.snapshot();
    let total = controller.config().total_cycles;
    RunOutcome::Quit {
        cycles_completed: total.saturating_sub(snapshot.cycles_remaining),
    }
}

// ============================================================================
// Tests
// ============================================================================
