//! Persistence error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or writing saved timer data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The file or its directory could not be read or written.
    #[error("Failed to access {}: {reason}", .path.display())]
    Io { path: PathBuf, reason: String },

    /// The file exists but does not hold the expected JSON.
    #[error("Invalid data in {}: {reason}", .path.display())]
    Serialization { path: PathBuf, reason: String },

    /// The platform has no per-user data directory.
    #[error("No data directory available; set FOCUS_TIMER_DATA_DIR or pass --data-dir")]
    NoDataDir,
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn serialization(path: impl Into<PathBuf>, err: &serde_json::Error) -> Self {
        Self::Serialization {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Returns true if the saved data was unreadable rather than missing.
    #[must_use]
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Returns true if no storage location could be determined.
    #[must_use]
    pub fn is_no_data_dir(&self) -> bool {
        matches!(self, Self::NoDataDir)
    }
}
