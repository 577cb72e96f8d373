//! Notification error types.

use thiserror::Error;

/// Errors raised when announcing a finished countdown.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The output the notifier writes to rejected the write.
    #[error("Failed to write completion notice: {0}")]
    Output(String),

    /// The notifier is not usable in this environment.
    #[error("Notifier unavailable: {0}")]
    Unavailable(String),
}

impl NotifyError {
    /// Returns true if the notifier itself cannot work here.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<std::io::Error> for NotifyError {
    fn from(err: std::io::Error) -> Self {
        Self::Output(err.to_string())
    }
}
