//! Display utilities for the focus timer CLI.
//!
//! This module provides formatted output for:
//! - The live countdown line
//! - Start, resume, pause and completion messages
//! - Saved state and preferences
//! - Error messages
//!
//! Each `show_*` function prints the matching `format_*` string.

use std::io::{self, Write};

use crate::persistence::{PersistedState, Preferences};
use crate::types::{TimeParts, TimerState};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Redraws the countdown line in place.
    pub fn show_tick(state: &TimerState) {
        let mut out = io::stdout();
        // A closed stdout only loses the redraw
        let _ = write!(out, "\r{}", Self::format_tick(state));
        let _ = out.flush();
    }

    /// Ends the in-place countdown line.
    pub fn finish_line() {
        println!();
    }

    pub fn show_started(total_seconds: u64, goal: Option<&str>) {
        println!("{}", Self::format_started(total_seconds, goal));
    }

    pub fn show_resumed(remaining_seconds: u64, goal: Option<&str>) {
        println!("{}", Self::format_resumed(remaining_seconds, goal));
    }

    pub fn show_paused(remaining_seconds: u64) {
        println!("{}", Self::format_paused(remaining_seconds));
    }

    pub fn show_completed(total_seconds: u64) {
        println!("{}", Self::format_completed(total_seconds));
    }

    /// Shows the saved state, or that there is none.
    pub fn show_saved_state(state: Option<&PersistedState>) {
        println!("{}", Self::format_saved_state(state));
    }

    pub fn show_preferences(preferences: &Preferences) {
        println!("{}", Self::format_preferences(preferences));
    }

    pub fn show_cleared() {
        println!("Saved timer state cleared");
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    // ------------------------------------------------------------------------
    // Formatting
    // ------------------------------------------------------------------------

    fn format_tick(state: &TimerState) -> String {
        format!("{} remaining", state.formatted())
    }

    fn format_started(total_seconds: u64, goal: Option<&str>) -> String {
        with_goal(
            format!("Focus session started: {}", Self::format_time(total_seconds)),
            goal,
        )
    }

    fn format_resumed(remaining_seconds: u64, goal: Option<&str>) -> String {
        with_goal(
            format!(
                "Resuming saved session: {} left",
                Self::format_time(remaining_seconds)
            ),
            goal,
        )
    }

    fn format_paused(remaining_seconds: u64) -> String {
        format!(
            "Paused with {} left; run again to resume",
            Self::format_time(remaining_seconds)
        )
    }

    fn format_completed(total_seconds: u64) -> String {
        format!("Session complete ({})", Self::format_time(total_seconds))
    }

    fn format_saved_state(state: Option<&PersistedState>) -> String {
        let Some(state) = state else {
            return "No saved timer state".to_string();
        };

        let mut lines = vec![
            "Saved timer state".to_string(),
            "─────────────────".to_string(),
            format!("Status:    {}", state.status),
            format!("Remaining: {}", Self::format_time(state.time_remaining)),
            format!("Duration:  {}", Self::format_time(state.user_set_duration)),
        ];
        if let Some(goal) = state.goal() {
            lines.push(format!("Goal:      {}", goal));
        }
        lines.join("\n")
    }

    fn format_preferences(preferences: &Preferences) -> String {
        let sound = if preferences.is_muted { "muted" } else { "on" };
        [
            "Preferences".to_string(),
            "───────────".to_string(),
            format!(
                "Duration: {}",
                Self::format_time(preferences.preferred_duration_seconds)
            ),
            format!("Goal:     {}", preferences.goal().unwrap_or("(none)")),
            format!("Sound:    {}", sound),
        ]
        .join("\n")
    }

    /// Formats seconds as `HH:MM:SS`.
    fn format_time(total_seconds: u64) -> String {
        TimeParts::from_seconds(total_seconds).to_string()
    }
}

fn with_goal(line: String, goal: Option<&str>) -> String {
    match goal {
        Some(goal) => format!("{}\n  Goal: {}", line, goal),
        None => line,
    }
}

// ============================================================================
// Tests
// ============================================================================
