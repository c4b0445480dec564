//! CLI module for breathwork.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `display`: Output formatting and display logic
//! - `runner`: Event loop that drives a session in the terminal

pub mod commands;
pub mod display;
pub mod runner;

pub use commands::{Cli, Commands, ConfigAction, StartArgs};
pub use display::Display;
pub use runner::{parse_command, run_session, spawn_ctrl_c, spawn_stdin_commands, RunOutcome, UserCommand};
