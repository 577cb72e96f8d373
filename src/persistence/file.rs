//! JSON-file implementation of [`StateStore`].

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::{PersistedState, PersistenceError, Preferences, StateStore};
use crate::worker::{Clock, SystemClock};

/// File holding the interrupted countdown.
pub const STATE_FILE_NAME: &str = "timer-state.json";

/// File holding the user's preferences.
pub const PREFERENCES_FILE_NAME: &str = "timer-preferences.json";

/// Directory created under the platform data directory.
pub const DATA_DIR_NAME: &str = "focus-timer";

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "FOCUS_TIMER_DATA_DIR";

/// Stores state and preferences as two JSON files in one directory.
///
/// The directory is created on the first save.
pub struct JsonFileStore {
    dir: PathBuf,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for JsonFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileStore")
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

impl JsonFileStore {
    /// Creates a store rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_clock(dir, SystemClock)
    }

    /// Creates a store that uses `clock` for stamping and staleness.
    #[must_use]
    pub fn with_clock<C: Clock>(dir: impl Into<PathBuf>, clock: C) -> Self {
        Self {
            dir: dir.into(),
            clock: Box::new(clock),
        }
    }

    /// Creates a store in the platform data directory.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::NoDataDir`] if the platform has none.
    pub fn default_location() -> Result<Self, PersistenceError> {
        let base = dirs::data_dir().ok_or(PersistenceError::NoDataDir)?;
        Ok(Self::new(base.join(DATA_DIR_NAME)))
    }

    /// Returns the directory holding both files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE_NAME)
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.dir.join(PREFERENCES_FILE_NAME)
    }

    // ------------------------------------------------------------------------
    // Fallible operations
    // ------------------------------------------------------------------------

    /// Reads the saved state, discarding it if stale.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn try_load_state(&self) -> Result<Option<PersistedState>, PersistenceError> {
        let Some(state) = read_json::<PersistedState>(&self.state_path())? else {
            return Ok(None);
        };

        if state.is_stale(self.clock.now_millis()) {
            debug!(last_updated = state.last_updated, "Ignoring stale timer state");
            return Ok(None);
        }
        Ok(Some(state))
    }

    /// Writes `state` stamped with the current time and returns what was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn try_save_state(&self, state: &PersistedState) -> Result<PersistedState, PersistenceError> {
        let stamped = PersistedState {
            last_updated: self.clock.now_millis(),
            ..state.clone()
        };
        write_json(&self.state_path(), &stamped)?;
        debug!(status = %stamped.status, remaining = stamped.time_remaining, "Saved timer state");
        Ok(stamped)
    }

    /// Deletes the saved state. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn try_clear_state(&self) -> Result<(), PersistenceError> {
        let path = self.state_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistenceError::io(path, &e)),
        }
    }

    /// Reads the preferences, or defaults if none were saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn try_load_preferences(&self) -> Result<Preferences, PersistenceError> {
        Ok(read_json(&self.preferences_path())?.unwrap_or_default())
    }

    /// Writes the preferences.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn try_save_preferences(&self, preferences: &Preferences) -> Result<(), PersistenceError> {
        write_json(&self.preferences_path(), preferences)
    }
}

impl StateStore for JsonFileStore {
    fn load_state(&self) -> Option<PersistedState> {
        self.try_load_state().unwrap_or_else(|e| {
            warn!("Failed to load timer state: {}", e);
            None
        })
    }

    fn save_state(&self, state: &PersistedState) {
        if let Err(e) = self.try_save_state(state) {
            warn!("Failed to save timer state: {}", e);
        }
    }

    fn clear_state(&self) {
        if let Err(e) = self.try_clear_state() {
            warn!("Failed to clear timer state: {}", e);
        }
    }

    fn load_preferences(&self) -> Preferences {
        self.try_load_preferences().unwrap_or_else(|e| {
            warn!("Failed to load preferences: {}", e);
            Preferences::default()
        })
    }

    fn save_preferences(&self, preferences: &Preferences) {
        if let Err(e) = self.try_save_preferences(preferences) {
            warn!("Failed to save preferences: {}", e);
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PersistenceError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(PersistenceError::io(path, &e)),
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| PersistenceError::serialization(path, &e))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, &e))?;
    }

    let json =
        serde_json::to_string_pretty(value).map_err(|e| PersistenceError::serialization(path, &e))?;

    // Write then rename so a crash never leaves a half-written file
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| PersistenceError::io(&tmp, &e))?;
    fs::rename(&tmp, path).map_err(|e| PersistenceError::io(path, &e))
}

// ============================================================================
// Tests
// ============================================================================
