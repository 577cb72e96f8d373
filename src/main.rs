//! Focus Timer CLI - a drift-corrected countdown for focused work
//!
//! - `run` counts down in the foreground; Ctrl-C pauses and saves
//! - `status` / `clear` inspect or discard the saved countdown
//! - `prefs` shows or updates the preferred duration, goal and sound

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::warn;

use focus_timer::cli::{run_countdown, Cli, Commands, Display, PrefsArgs, RunOptions};
use focus_timer::manager::TimerManager;
use focus_timer::notification::BellNotifier;
use focus_timer::persistence::JsonFileStore;

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
///
/// `RUST_LOG` wins; otherwise `warn`, or `debug` with `--verbose`.
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
        Some(Commands::Run(args)) => {
            let store = open_store(cli.data_dir)?;
            let manager = TimerManager::new().context("Failed to start the timer")?;
            let notifier = BellNotifier::new(false);
            run_countdown(
                manager,
                &store,
                &notifier,
                RunOptions::from(&args),
                interrupted(),
            )
            .await?;
        }
        Some(Commands::Status) => {
            let store = open_store(cli.data_dir)?;
            let state = store
                .try_load_state()
                .context("Failed to read saved timer state")?;
            Display::show_saved_state(state.as_ref());
        }
        Some(Commands::Clear) => {
            let store = open_store(cli.data_dir)?;
            store
                .try_clear_state()
                .context("Failed to clear saved timer state")?;
            Display::show_cleared();
        }
        Some(Commands::Prefs(args)) => {
            let store = open_store(cli.data_dir)?;
            update_preferences(&store, &args)?;
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

/// Opens the store in `data_dir`, or in the platform data directory.
fn open_store(data_dir: Option<PathBuf>) -> Result<JsonFileStore> {
    match data_dir {
        Some(dir) => Ok(JsonFileStore::new(dir)),
        None => JsonFileStore::default_location().context("Failed to locate data directory"),
    }
}

/// Applies any requested changes, then shows the preferences.
fn update_preferences(store: &JsonFileStore, args: &PrefsArgs) -> Result<()> {
    let mut preferences = store
        .try_load_preferences()
        .context("Failed to read preferences")?;

    if !args.is_empty() {
        if let Some(seconds) = args.preferred_duration_seconds() {
            preferences.preferred_duration_seconds = seconds;
        }
        if let Some(goal) = &args.goal {
            preferences.session_goal = goal.trim().to_string();
        }
        if let Some(muted) = args.muted() {
            preferences.is_muted = muted;
        }
        store
            .try_save_preferences(&preferences)
            .context("Failed to save preferences")?;
    }

    Display::show_preferences(&preferences);
    Ok(())
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Ctrl-C handling unavailable: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
