//! Core data types for the focus timer.
//!
//! This module defines the data structures shared by the worker and the
//! manager:
//! - Timer settings with per-field defaults (0h 25m 0s)
//! - Remaining-time decomposition into hours/minutes/seconds
//! - The manager's mirrored timer state and derived status

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Seconds in one hour.
pub const SECONDS_IN_HOUR: u64 = 3600;

/// Seconds in one minute.
pub const SECONDS_IN_MINUTE: u64 = 60;

/// Default hours when a settings field is missing.
pub const DEFAULT_HOURS: u64 = 0;

/// Default minutes when a settings field is missing.
pub const DEFAULT_MINUTES: u64 = 25;

/// Default seconds when a settings field is missing.
pub const DEFAULT_SECONDS: u64 = 0;

/// Default countdown length in seconds (25 minutes).
pub const DEFAULT_DURATION_SECONDS: u64 =
    DEFAULT_HOURS * SECONDS_IN_HOUR + DEFAULT_MINUTES * SECONDS_IN_MINUTE + DEFAULT_SECONDS;

// ============================================================================
// TimerSettings
// ============================================================================

/// Requested countdown duration.
///
/// Every field is optional; a missing field falls back to its default
/// independently of the others, so `{hours: 1}` means 1h 25m 0s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    /// Hours component
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<u64>,
    /// Minutes component
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u64>,
    /// Seconds component
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u64>,
}

impl TimerSettings {
    /// Creates settings with all three fields present.
    pub fn new(hours: u64, minutes: u64, seconds: u64) -> Self {
        Self {
            hours: Some(hours),
            minutes: Some(minutes),
            seconds: Some(seconds),
        }
    }

    /// Creates fully-specified settings from a total number of seconds.
    pub fn from_seconds(total_seconds: u64) -> Self {
        let parts = TimeParts::from_seconds(total_seconds);
        Self::new(parts.hours, parts.minutes, parts.seconds)
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.hours.is_none() && self.minutes.is_none() && self.seconds.is_none()
    }

    /// Returns the total duration in seconds, defaulting missing fields.
    pub fn total_seconds(&self) -> u64 {
        TimeParts {
            hours: self.hours.unwrap_or(DEFAULT_HOURS),
            minutes: self.minutes.unwrap_or(DEFAULT_MINUTES),
            seconds: self.seconds.unwrap_or(DEFAULT_SECONDS),
        }
        .total_seconds()
    }
}

// ============================================================================
// TimeParts
// ============================================================================

/// Remaining time split into display components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeParts {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeParts {
    /// Decomposes seconds by truncation: `h = s/3600`, `m = (s%3600)/60`, `s = s%60`.
    pub fn from_seconds(total_seconds: u64) -> Self {
        Self {
            hours: total_seconds / SECONDS_IN_HOUR,
            minutes: (total_seconds % SECONDS_IN_HOUR) / SECONDS_IN_MINUTE,
            seconds: total_seconds % SECONDS_IN_MINUTE,
        }
    }

    /// Recombines the components into seconds.
    pub fn total_seconds(&self) -> u64 {
        self.hours
            .saturating_mul(SECONDS_IN_HOUR)
            .saturating_add(self.minutes.saturating_mul(SECONDS_IN_MINUTE))
            .saturating_add(self.seconds)
    }
}

impl fmt::Display for TimeParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

// ============================================================================
// TimerStatus
// ============================================================================

/// Coarse status of the timer as seen by the application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    /// Not counting down
    #[default]
    Stopped,
    /// Counting down
    Running,
    /// Counting halted with time left
    Paused,
    /// Reached zero
    Completed,
}

impl TimerStatus {
    /// Returns the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Stopped => "stopped",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
            TimerStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// The manager's snapshot of the last state reported by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub is_running: bool,
    /// Only ever set by a status event that carried the paused flag
    pub is_paused: bool,
    pub is_completed: bool,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            hours: DEFAULT_HOURS,
            minutes: DEFAULT_MINUTES,
            seconds: DEFAULT_SECONDS,
            is_running: false,
            is_paused: false,
            is_completed: false,
        }
    }
}

impl TimerState {
    /// Returns the displayed time components.
    pub fn time_parts(&self) -> TimeParts {
        TimeParts {
            hours: self.hours,
            minutes: self.minutes,
            seconds: self.seconds,
        }
    }

    /// Returns the displayed time in seconds.
    pub fn remaining_seconds(&self) -> u64 {
        self.time_parts().total_seconds()
    }

    /// Formats the displayed time as `HH:MM:SS`.
    pub fn formatted(&self) -> String {
        self.time_parts().to_string()
    }

    /// Derives the status: completed wins over running, running over paused.
    pub fn status(&self) -> TimerStatus {
        if self.is_completed {
            TimerStatus::Completed
        } else if self.is_running {
            TimerStatus::Running
        } else if self.is_paused {
            TimerStatus::Paused
        } else {
            TimerStatus::Stopped
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // TimerSettings Tests
    // ------------------------------------------------------------------------

    mod timer_settings_tests {
        use super::*;

        #[test]
        fn test_empty_settings_use_default_duration() {
            let settings = TimerSettings::default();
            assert!(settings.is_empty());
            assert_eq!(settings.total_seconds(), 25 * 60);
            assert_eq!(settings.total_seconds(), DEFAULT_DURATION_SECONDS);
        }

        #[test]
        fn test_fields_default_independently() {
            let settings = TimerSettings {
                hours: Some(1),
                ..Default::default()
            };
            assert_eq!(settings.total_seconds(), 3600 + 25 * 60);

            let settings = TimerSettings {
                seconds: Some(30),
                ..Default::default()
            };
            assert_eq!(settings.total_seconds(), 25 * 60 + 30);
        }

        #[test]
        fn test_new_and_total() {
            assert_eq!(TimerSettings::new(1, 2, 3).total_seconds(), 3723);
            assert_eq!(TimerSettings::new(0, 0, 0).total_seconds(), 0);
        }

        #[test]
        fn test_from_seconds() {
            let settings = TimerSettings::from_seconds(3723);
            assert_eq!(settings, TimerSettings::new(1, 2, 3));
        }

        #[test]
        fn test_total_saturates_instead_of_overflowing() {
            let settings = TimerSettings::new(u64::MAX, 59, 59);
            assert_eq!(settings.total_seconds(), u64::MAX);
        }

        #[test]
        fn test_serialize_skips_missing_fields() {
            let settings = TimerSettings {
                minutes: Some(30),
                ..Default::default()
            };
            let json = serde_json::to_string(&settings).unwrap();
            assert_eq!(json, r#"{"minutes":30}"#);

            let parsed: TimerSettings = serde_json::from_str("{}").unwrap();
            assert!(parsed.is_empty());
        }
    }

    // ------------------------------------------------------------------------
    // TimeParts Tests
    // ------------------------------------------------------------------------

    mod time_parts_tests {
        use super::*;

        #[test]
        fn test_decomposition_examples() {
            assert_eq!(
                TimeParts::from_seconds(3723),
                TimeParts {
                    hours: 1,
                    minutes: 2,
                    seconds: 3
                }
            );
            assert_eq!(TimeParts::from_seconds(0), TimeParts::default());
            assert_eq!(
                TimeParts::from_seconds(359_999),
                TimeParts {
                    hours: 99,
                    minutes: 59,
                    seconds: 59
                }
            );
        }

        #[test]
        fn test_decomposition_recomposes_for_full_display_range() {
            for s in 0..=359_999u64 {
                let parts = TimeParts::from_seconds(s);
                assert!(parts.minutes < 60 && parts.seconds < 60);
                assert_eq!(parts.total_seconds(), s, "recompose failed for {}", s);
            }
        }

        #[test]
        fn test_display_is_zero_padded() {
            assert_eq!(TimeParts::from_seconds(3723).to_string(), "01:02:03");
            assert_eq!(TimeParts::from_seconds(1500).to_string(), "00:25:00");
            assert_eq!(TimeParts::from_seconds(360_000).to_string(), "100:00:00");
        }
    }

    // ------------------------------------------------------------------------
    // TimerStatus / TimerState Tests
    // ------------------------------------------------------------------------

    mod timer_state_tests {
        use super::*;

        #[test]
        fn test_default_state() {
            let state = TimerState::default();
            assert_eq!((state.hours, state.minutes, state.seconds), (0, 25, 0));
            assert!(!state.is_running);
            assert!(!state.is_completed);
            assert_eq!(state.status(), TimerStatus::Stopped);
            assert_eq!(state.formatted(), "00:25:00");
            assert_eq!(state.remaining_seconds(), 1500);
        }

        #[test]
        fn test_status_precedence() {
            let completed = TimerState {
                is_completed: true,
                is_running: true,
                ..Default::default()
            };
            assert_eq!(completed.status(), TimerStatus::Completed);

            let running = TimerState {
                is_running: true,
                ..Default::default()
            };
            assert_eq!(running.status(), TimerStatus::Running);

            let paused = TimerState {
                is_paused: true,
                ..Default::default()
            };
            assert_eq!(paused.status(), TimerStatus::Paused);
        }

        #[test]
        fn test_status_serde() {
            let json = serde_json::to_string(&TimerStatus::Paused).unwrap();
            assert_eq!(json, "\"paused\"");
            let parsed: TimerStatus = serde_json::from_str("\"completed\"").unwrap();
            assert_eq!(parsed, TimerStatus::Completed);
            assert_eq!(TimerStatus::Running.to_string(), "running");
        }

        #[test]
        fn test_state_serializes_camel_case() {
            let json = serde_json::to_string(&TimerState::default()).unwrap();
            assert!(json.contains("\"isRunning\":false"));
            assert!(json.contains("\"isCompleted\":false"));
        }
    }
}
