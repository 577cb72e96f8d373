//! Saved timer state and user preferences.
//!
//! This module contains:
//! - `PersistedState`: a snapshot of an interrupted countdown
//! - `Preferences`: the preferred duration, session goal and mute flag
//! - `StateStore`: the storage interface used by the application shell
//! - `JsonFileStore`: two JSON files in a per-user data directory
//!
//! Storage never affects the timer itself. Every `StateStore` method logs
//! its own failures and falls back to "nothing saved" or to defaults.

mod error;
mod file;

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{TimerSettings, TimerStatus, DEFAULT_DURATION_SECONDS};

pub use error::PersistenceError;
pub use file::{
    JsonFileStore, DATA_DIR_ENV, DATA_DIR_NAME, PREFERENCES_FILE_NAME, STATE_FILE_NAME,
};

/// Saved states older than this are ignored on load.
pub const STATE_TTL: Duration = Duration::from_secs(60 * 60);

// ============================================================================
// PersistedState
// ============================================================================

/// Snapshot of a countdown, written when the shell exits mid-run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// Seconds left when the snapshot was taken
    pub time_remaining: u64,
    /// Duration the user originally asked for, in seconds
    pub user_set_duration: u64,
    pub is_completed: bool,
    pub status: TimerStatus,
    #[serde(default)]
    pub session_goal: String,
    /// Epoch milliseconds of the last save
    #[serde(default)]
    pub last_updated: u64,
}

impl PersistedState {
    /// Creates an unstamped snapshot.
    #[must_use]
    pub fn new(
        time_remaining: u64,
        user_set_duration: u64,
        status: TimerStatus,
        session_goal: impl Into<String>,
    ) -> Self {
        Self {
            time_remaining,
            user_set_duration,
            is_completed: status == TimerStatus::Completed,
            status,
            session_goal: session_goal.into(),
            last_updated: 0,
        }
    }

    /// Returns true if the snapshot describes a countdown worth continuing.
    #[must_use]
    pub fn is_resumable(&self) -> bool {
        matches!(self.status, TimerStatus::Running | TimerStatus::Paused)
            && self.time_remaining > 0
    }

    /// Returns true if the snapshot is at least [`STATE_TTL`] old at `now_millis`.
    ///
    /// A `last_updated` in the future counts as fresh.
    #[must_use]
    pub fn is_stale(&self, now_millis: u64) -> bool {
        let ttl = u64::try_from(STATE_TTL.as_millis()).unwrap_or(u64::MAX);
        now_millis.saturating_sub(self.last_updated) >= ttl
    }

    /// Settings that restart the countdown from the saved remaining time.
    #[must_use]
    pub fn resume_settings(&self) -> TimerSettings {
        TimerSettings::from_seconds(self.time_remaining)
    }

    /// Returns the session goal, or `None` if it is blank.
    #[must_use]
    pub fn goal(&self) -> Option<&str> {
        non_blank(&self.session_goal)
    }
}

// ============================================================================
// Preferences
// ============================================================================

fn default_preferred_duration_seconds() -> u64 {
    DEFAULT_DURATION_SECONDS
}

/// User preferences that outlive a single countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default = "default_preferred_duration_seconds")]
    pub preferred_duration_seconds: u64,
    #[serde(default)]
    pub session_goal: String,
    #[serde(default)]
    pub is_muted: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            preferred_duration_seconds: default_preferred_duration_seconds(),
            session_goal: String::new(),
            is_muted: false,
        }
    }
}

impl Preferences {
    /// The preferred duration as timer settings.
    #[must_use]
    pub fn preferred_settings(&self) -> TimerSettings {
        TimerSettings::from_seconds(self.preferred_duration_seconds)
    }

    /// Returns the session goal, or `None` if it is blank.
    #[must_use]
    pub fn goal(&self) -> Option<&str> {
        non_blank(&self.session_goal)
    }
}

fn non_blank(goal: &str) -> Option<&str> {
    let trimmed = goal.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

// ============================================================================
// StateStore
// ============================================================================

/// Storage for the interrupted countdown and the user's preferences.
///
/// Implementations handle their own errors: loads fall back to `None` or
/// to [`Preferences::default`], saves and clears log and carry on.
pub trait StateStore {
    /// Returns the saved state if there is one and it is not stale.
    fn load_state(&self) -> Option<PersistedState>;

    /// Saves `state`, stamping it with the current time.
    fn save_state(&self, state: &PersistedState);

    /// Removes any saved state.
    fn clear_state(&self);

    /// Returns the saved preferences, or defaults.
    fn load_preferences(&self) -> Preferences;

    /// Saves `preferences`.
    fn save_preferences(&self, preferences: &Preferences);
}

/// In-memory store for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<Option<PersistedState>>,
    preferences: Mutex<Option<Preferences>>,
    saves: Mutex<Vec<PersistedState>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `state`, stored as given.
    #[must_use]
    pub fn with_state(state: PersistedState) -> Self {
        let store = Self::default();
        *store.state.lock().unwrap_or_else(PoisonError::into_inner) = Some(state);
        store
    }

    /// Every state passed to `save_state`, oldest first.
    #[must_use]
    pub fn saved_states(&self) -> Vec<PersistedState> {
        self.saves
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the held state without the staleness check.
    #[must_use]
    pub fn current_state(&self) -> Option<PersistedState> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StateStore for MemoryStore {
    fn load_state(&self) -> Option<PersistedState> {
        self.current_state()
    }

    fn save_state(&self, state: &PersistedState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = Some(state.clone());
        self.saves
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(state.clone());
    }

    fn clear_state(&self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn load_preferences(&self) -> Preferences {
        self.preferences
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_default()
    }

    fn save_preferences(&self, preferences: &Preferences) {
        *self
            .preferences
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(preferences.clone());
    }
}

// ============================================================================
// Tests
// ============================================================================
