//! breathwork - guided breathing sessions in the terminal
//!
//! Each cycle walks through four phases:
//! - breathe in
//! - hold
//! - breathe out
//! - hold
//!
//! A rising tone marks every inhale, a falling tone every exhale, and a
//! short chime the end of the session.

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use tokio::sync::mpsc;

use breathwork::cli::{
    run_session, spawn_ctrl_c, spawn_stdin_commands, Cli, Commands, ConfigAction, Display,
    StartArgs,
};
use breathwork::patterns::builtin_patterns;
use breathwork::session::{Collaborators, SessionController, TokioClock, TokioScheduler};
use breathwork::settings::Settings;
use breathwork::sound::{try_create_player, CuePlayer, SilentCuePlayer};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Start(args)) => {
            let settings = load_settings()?;
            run_start(&args, &settings).await?;
        }
        Some(Commands::Patterns) => {
            let settings = load_settings()?;
            Display::show_patterns(builtin_patterns(), &settings.default_pattern);
        }
        Some(Commands::Config { action }) => {
            let path = Settings::default_path()?;
            match action {
                ConfigAction::Show => {
                    let settings = Settings::load_from(&path)?;
                    Display::show_settings(&settings, &path)?;
                }
                ConfigAction::Path => println!("{}", path.display()),
                ConfigAction::Init { force } => {
                    if path.exists() && !force {
                        bail!(
                            "settings file already exists at {} (use --force to overwrite)",
                            path.display()
                        );
                    }
                    Settings::default().save_to(&path)?;
                    println!("Wrote default settings to {}", path.display());
                }
            }
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

fn load_settings() -> Result<Settings> {
    Settings::load().context("failed to load settings")
}

/// Runs one session in the foreground.
async fn run_start(args: &StartArgs, settings: &Settings) -> Result<()> {
    let config = args.resolve(settings)?;

    let mut options = settings.controller_options();
    if args.no_pre_roll {
        options.pre_roll_seconds = 0;
    }

    let cues: Box<dyn CuePlayer> = if args.no_sound || !settings.sound_enabled {
        Box::new(SilentCuePlayer)
    } else {
        match try_create_player(settings.cue_sources()) {
            Some(player) => Box::new(player),
            None => Box::new(SilentCuePlayer),
        }
    };

    let (scheduler, timers) = TokioScheduler::new();
    let (event_tx, events) = mpsc::unbounded_channel();
    let mut controller = SessionController::new(
        config,
        options,
        Collaborators {
            clock: Box::new(TokioClock),
            scheduler: Box::new(scheduler),
            cues,
            observer: Box::new(event_tx),
        },
    )
    .context("invalid session configuration")?;

    let (command_tx, commands) = mpsc::unbounded_channel();
    spawn_ctrl_c(command_tx.clone());
    spawn_stdin_commands(command_tx);

    Display::show_session_header(&config);
    let total_cycles = config.total_cycles;
    let outcome = run_session(&mut controller, timers, events, commands, |event| {
        Display::show_event(event, total_cycles)
    })
    .await;
    Display::show_outcome(&outcome);

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
