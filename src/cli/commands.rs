//! Command definitions for the breathwork CLI.
//!
//! Uses clap derive macro for argument parsing.

use clap::{Args, Parser, Subcommand};

use crate::patterns::{find_pattern, PatternError};
use crate::settings::Settings;
use crate::types::{SessionConfig, MAX_CYCLES, MAX_PHASE_MS};

// ============================================================================
// CLI Structure
// ============================================================================

/// breathwork - guided breathing sessions in the terminal
#[derive(Parser, Debug)]
#[command(
    name = "breathwork",
    version,
    about = "Guided breathing sessions with audio cues",
    long_about = "Runs timed inhale / hold / exhale / hold breathing sessions in the terminal.\n\
                  Press Enter to pause or resume, type q and Enter to quit.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start a breathing session
    Start(StartArgs),

    /// List the built-in breathing patterns
    Patterns,

    /// Show settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// `config` subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the effective settings as JSON
    Show,
    /// Print the settings file location
    Path,
    /// Write a settings file with the default values
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
}

// ============================================================================
// Start Command Arguments
// ============================================================================

/// Arguments for the start command
#[derive(Args, Debug, Clone, Default)]
pub struct StartArgs {
    /// Built-in pattern to use (see `breathwork patterns`)
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Inhale and exhale duration in milliseconds
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u64).range(1..=MAX_PHASE_MS)
    )]
    pub breath: Option<u64>,

    /// Hold duration in milliseconds
    #[arg(
        long,
        value_parser = clap::value_parser!(u64).range(0..=MAX_PHASE_MS)
    )]
    pub hold: Option<u64>,

    /// Number of cycles
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_CYCLES))
    )]
    pub cycles: Option<u32>,

    /// Disable audio cues
    #[arg(long)]
    pub no_sound: bool,

    /// Skip the 3-2-1 countdown
    #[arg(long)]
    pub no_pre_roll: bool,
}

impl StartArgs {
    /// Builds the session configuration: the chosen pattern (or the
    /// settings' default) with any explicit durations applied on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern name is unknown.
    pub fn resolve(&self, settings: &Settings) -> Result<SessionConfig, PatternError> {
        let name = self.pattern.as_deref().unwrap_or(&settings.default_pattern);
        let mut config = find_pattern(name)?.config();

        if let Some(breath) = self.breath {
            config = config.with_breath_ms(breath);
        }
        if let Some(hold) = self.hold {
            config = config.with_hold_ms(hold);
        }
        if let Some(cycles) = self.cycles {
            config = config.with_cycles(cycles);
        }
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_no_args() {
            let cli = Cli::parse_from(["breathwork"]);
            assert!(cli.command.is_none());
            assert!(!cli.verbose);
        }

        #[test]
        fn test_parse_verbose_flag() {
            let cli = Cli::parse_from(["breathwork", "-v", "patterns"]);
            assert!(cli.verbose);
            assert!(matches!(cli.command, Some(Commands::Patterns)));
        }

        #[test]
        fn test_parse_config_actions() {
            let cli = Cli::parse_from(["breathwork", "config", "show"]);
            assert!(matches!(
                cli.command,
                Some(Commands::Config {
                    action: ConfigAction::Show
                })
            ));

            let cli = Cli::parse_from(["breathwork", "config", "path"]);
            assert!(matches!(
                cli.command,
                Some(Commands::Config {
                    action: ConfigAction::Path
                })
            ));
        }

        #[test]
        fn test_parse_config_init() {
            let cli = Cli::parse_from(["breathwork", "config", "init"]);
            assert!(matches!(
                cli.command,
                Some(Commands::Config {
                    action: ConfigAction::Init { force: false }
                })
            ));

            let cli = Cli::parse_from(["breathwork", "config", "init", "--force"]);
            assert!(matches!(
                cli.command,
                Some(Commands::Config {
                    action: ConfigAction::Init { force: true }
                })
            ));
        }

        #[test]
        fn test_parse_completions() {
            let cli = Cli::parse_from(["breathwork", "completions", "zsh"]);
            assert!(matches!(cli.command, Some(Commands::Completions { .. })));
        }
    }

    mod start_args_tests {
        use super::*;

        fn parse_start(args: &[&str]) -> StartArgs {
            let mut argv = vec!["breathwork", "start"];
            argv.extend_from_slice(args);
            match Cli::parse_from(argv).command {
                Some(Commands::Start(args)) => args,
                other => panic!("Expected Start command, got {:?}", other),
            }
        }

        #[test]
        fn test_defaults() {
            let args = parse_start(&[]);
            assert_eq!(args.pattern, None);
            assert_eq!(args.breath, None);
            assert_eq!(args.hold, None);
            assert_eq!(args.cycles, None);
            assert!(!args.no_sound);
            assert!(!args.no_pre_roll);
        }

        #[test]
        fn test_all_options() {
            let args = parse_start(&[
                "--pattern",
                "calm",
                "--breath",
                "3000",
                "--hold",
                "0",
                "--cycles",
                "2",
                "--no-sound",
                "--no-pre-roll",
            ]);
            assert_eq!(args.pattern.as_deref(), Some("calm"));
            assert_eq!(args.breath, Some(3_000));
            assert_eq!(args.hold, Some(0));
            assert_eq!(args.cycles, Some(2));
            assert!(args.no_sound);
            assert!(args.no_pre_roll);
        }

        #[test]
        fn test_zero_cycles_rejected() {
            let result = Cli::try_parse_from(["breathwork", "start", "--cycles", "0"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_zero_breath_rejected() {
            let result = Cli::try_parse_from(["breathwork", "start", "--breath", "0"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_negative_hold_rejected() {
            let result = Cli::try_parse_from(["breathwork", "start", "--hold", "-1"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_resolve_uses_settings_default_pattern() {
            let settings = Settings {
                default_pattern: "quick".to_string(),
                ..Settings::default()
            };

            let config = StartArgs::default().resolve(&settings).unwrap();

            assert_eq!(config, SessionConfig::new(3_000, 1_000, 5));
        }

        #[test]
        fn test_resolve_applies_overrides() {
            let args = StartArgs {
                pattern: Some("box".to_string()),
                hold: Some(0),
                cycles: Some(1),
                ..StartArgs::default()
            };

            let config = args.resolve(&Settings::default()).unwrap();

            assert_eq!(config, SessionConfig::new(4_000, 0, 1));
        }

        #[test]
        fn test_resolve_unknown_pattern() {
            let args = StartArgs {
                pattern: Some("nope".to_string()),
                ..StartArgs::default()
            };

            assert!(args.resolve(&Settings::default()).is_err());
        }
    }
}
