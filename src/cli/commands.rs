//! Command definitions for the focus timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::persistence::DATA_DIR_ENV;
use crate::types::{TimerSettings, SECONDS_IN_MINUTE};

/// Maximum length of a session goal in characters.
pub const MAX_GOAL_CHARS: usize = 100;

// ============================================================================
// CLI Structure
// ============================================================================

/// Focus Timer - a drift-corrected countdown for focused work
#[derive(Parser, Debug)]
#[command(
    name = "focus-timer",
    version,
    about = "Drift-corrected focus countdown timer",
    long_about = "A countdown timer for focused work sessions.\n\
                  The countdown runs on its own worker thread and is recomputed from the \
                  wall clock on every tick, so it stays accurate under load or suspension.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory for saved timer state and preferences
    #[arg(long, global = true, env = DATA_DIR_ENV, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a countdown in the foreground (Ctrl-C pauses and saves it)
    Run(RunArgs),

    /// Show the saved timer state
    Status,

    /// Discard the saved timer state
    Clear,

    /// Show or update preferences
    Prefs(PrefsArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Run Command Arguments
// ============================================================================

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Hours (0-99)
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=99))]
    pub hours: Option<u64>,

    /// Minutes (0-59)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(0..=59))]
    pub minutes: Option<u64>,

    /// Seconds (0-59)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(0..=59))]
    pub seconds: Option<u64>,

    /// What this session is for
    #[arg(short, long, value_parser = validate_goal)]
    pub goal: Option<String>,

    /// Do not ring the bell on completion
    #[arg(long)]
    pub mute: bool,

    /// Ignore any saved countdown and start over
    #[arg(long)]
    pub fresh: bool,
}

impl RunArgs {
    /// Settings from the duration flags, or `None` if none were given.
    ///
    /// Once any duration flag is present, the missing ones count as zero.
    #[must_use]
    pub fn settings(&self) -> Option<TimerSettings> {
        if self.hours.is_none() && self.minutes.is_none() && self.seconds.is_none() {
            return None;
        }
        Some(TimerSettings::new(
            self.hours.unwrap_or(0),
            self.minutes.unwrap_or(0),
            self.seconds.unwrap_or(0),
        ))
    }
}

// ============================================================================
// Prefs Command Arguments
// ============================================================================

/// Arguments for the prefs command
#[derive(Args, Debug, Clone, Default)]
pub struct PrefsArgs {
    /// Preferred duration in minutes (1-5999)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=5999))]
    pub minutes: Option<u64>,

    /// Default session goal (empty to clear)
    #[arg(short, long, value_parser = validate_goal)]
    pub goal: Option<String>,

    /// Mute completion notices by default
    #[arg(long, conflicts_with = "unmute")]
    pub mute: bool,

    /// Ring completion notices by default
    #[arg(long)]
    pub unmute: bool,
}

impl PrefsArgs {
    /// Returns true if no update was requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.minutes.is_none() && self.goal.is_none() && !self.mute && !self.unmute
    }

    /// Preferred duration in seconds, if given.
    #[must_use]
    pub fn preferred_duration_seconds(&self) -> Option<u64> {
        self.minutes.map(|minutes| minutes * SECONDS_IN_MINUTE)
    }

    /// Requested mute setting, if given.
    #[must_use]
    pub fn muted(&self) -> Option<bool> {
        match (self.mute, self.unmute) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates a session goal.
///
/// - Must not exceed 100 characters
fn validate_goal(s: &str) -> Result<String, String> {
    if s.chars().count() > MAX_GOAL_CHARS {
        return Err(format!(
            "goal must be at most {} characters",
            MAX_GOAL_CHARS
        ));
    }
    Ok(s.to_string())
}

// ============================================================================
// Tests
// ============================================================================
