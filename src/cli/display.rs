//! Display utilities for the breathwork CLI.
//!
//! This module provides formatted output for:
//! - Session progress (pre-roll, phases, pause state)
//! - Session summaries
//! - Pattern and settings listings
//! - Error messages

use std::path::Path;
use std::time::Duration;

use crate::cli::runner::RunOutcome;
use crate::patterns::BreathPattern;
use crate::session::SessionEvent;
use crate::settings::Settings;
use crate::types::{PhaseUpdate, SessionConfig};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the session plan before it starts.
    pub fn show_session_header(config: &SessionConfig) {
        println!(
            "Breathe in {}s, hold {}s, breathe out {}s, hold {}s",
            Self::format_ms(config.breath_duration_ms),
            Self::format_ms(config.hold_duration_ms),
            Self::format_ms(config.breath_duration_ms),
            Self::format_ms(config.hold_duration_ms),
        );
        let (minutes, seconds) = Self::format_time(config.total_duration());
        println!(
            "{} cycles, {}:{:02} total. Enter pauses, q quits.",
            config.total_cycles, minutes, seconds
        );
    }

    /// Shows one session event.
    pub fn show_event(event: &SessionEvent, total_cycles: u32) {
        match event {
            SessionEvent::PreRoll { count } => println!("  {}...", count),
            SessionEvent::PhaseChanged(update) => {
                println!("{}", Self::format_phase_line(update, total_cycles));
            }
            SessionEvent::Paused => println!("|| Paused. Press Enter to resume."),
            SessionEvent::Resumed(Some(update)) => {
                println!("> Resumed");
                println!("{}", Self::format_phase_line(update, total_cycles));
            }
            SessionEvent::Resumed(None) => println!("> Resumed"),
            SessionEvent::Completed => {}
        }
    }

    /// Shows how the session ended.
    pub fn show_outcome(outcome: &RunOutcome) {
        match outcome {
            RunOutcome::Completed { elapsed } => {
                let (minutes, seconds) = Self::format_time(*elapsed);
                println!("* Session complete ({}:{:02}). Well done.", minutes, seconds);
            }
            RunOutcome::Quit { cycles_completed } => {
                println!("[] Session ended early after {} cycle(s)", cycles_completed);
            }
        }
    }

    /// Lists the built-in patterns.
    pub fn show_patterns(patterns: &[BreathPattern], default_pattern: &str) {
        println!("Breathing patterns");
        println!("─────────────────────────────");
        for pattern in patterns {
            let marker = if pattern.name == default_pattern { "*" } else { " " };
            println!(
                "{} {:<6} {:>4}s / {:>4}s x{:<3} {}",
                marker,
                pattern.name,
                Self::format_ms(pattern.breath_ms),
                Self::format_ms(pattern.hold_ms),
                pattern.cycles,
                pattern.description
            );
        }
    }

    /// Prints settings as pretty JSON.
    pub fn show_settings(settings: &Settings, path: &Path) -> serde_json::Result<()> {
        println!("# {}", path.display());
        println!("{}", serde_json::to_string_pretty(settings)?);
        Ok(())
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("error: {}", message);
    }

    /// Formats a phase update as a single line.
    pub fn format_phase_line(update: &PhaseUpdate, total_cycles: u32) -> String {
        let cycle = total_cycles.saturating_sub(update.cycles_remaining) + 1;
        format!(
            "{:<12} {:>3}s   cycle {}/{}",
            update.phase.label(),
            update.countdown_seconds,
            cycle.min(total_cycles),
            total_cycles
        )
    }

    /// Formats milliseconds as seconds, dropping a zero fraction.
    fn format_ms(ms: u64) -> String {
        if ms % 1000 == 0 {
            (ms / 1000).to_string()
        } else {
            format!("{:.1}", ms as f64 / 1000.0)
        }
    }

    /// Formats a duration as (minutes, seconds).
    fn format_time(duration: Duration) -> (u64, u64) {
        let total_seconds = duration.as_secs();
        (total_seconds / 60, total_seconds % 60)
    }
}
