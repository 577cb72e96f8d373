//! Timer manager error types.

use thiserror::Error;

/// Errors surfaced by the timer manager.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// The worker context could not be created. Nothing works without it.
    #[error("Timer worker initialization failed: {0}")]
    Initialization(String),

    /// The worker context reported an internal fault.
    #[error("Timer worker error: {0}")]
    Transport(String),
}

impl TimerError {
    /// Returns true if this is a construction-time failure.
    #[must_use]
    pub fn is_initialization(&self) -> bool {
        matches!(self, Self::Initialization(_))
    }

    /// Returns true if the manager stays usable after this error.
    ///
    /// Transport faults leave the last known state in place and commands
    /// may be retried; initialization failures leave no timer at all.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
