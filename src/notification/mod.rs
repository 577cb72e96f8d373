//! Completion notification.
//!
//! The application shell calls a [`CompletionNotifier`] from its completion
//! observer. Two implementations are provided:
//!
//! - `BellNotifier`: rings the terminal bell and prints a completion line
//! - `MockNotifier`: records calls for tests
//!
//! A muted notifier accepts calls and does nothing. Errors are reported to
//! the caller, which logs them; a failed notification never stops a timer.

mod error;

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

pub use error::NotifyError;

/// ASCII BEL.
pub const BELL: &str = "\u{7}";

/// Announces that a countdown reached zero.
pub trait CompletionNotifier: Send + Sync {
    /// Announces completion, mentioning `goal` when there is one.
    ///
    /// # Errors
    ///
    /// Returns an error if the notice could not be delivered.
    fn notify_complete(&self, goal: Option<&str>) -> Result<(), NotifyError>;

    /// Returns true if notifications are suppressed.
    fn is_muted(&self) -> bool;

    /// Suppresses or re-enables notifications.
    fn set_muted(&self, muted: bool);
}

/// Formats the line printed when a countdown completes.
#[must_use]
pub fn completion_message(goal: Option<&str>) -> String {
    match goal {
        Some(goal) => format!("Focus session complete: {}", goal),
        None => "Focus session complete".to_string(),
    }
}

// ============================================================================
// BellNotifier
// ============================================================================

/// Terminal notifier: a bell followed by a completion line.
pub struct BellNotifier {
    out: Mutex<Box<dyn Write + Send>>,
    muted: AtomicBool,
}

impl BellNotifier {
    /// Creates a notifier writing to stdout.
    #[must_use]
    pub fn new(muted: bool) -> Self {
        Self::with_writer(Box::new(io::stdout()), muted)
    }

    /// Creates a notifier writing to `out`.
    #[must_use]
    pub fn with_writer(out: Box<dyn Write + Send>, muted: bool) -> Self {
        Self {
            out: Mutex::new(out),
            muted: AtomicBool::new(muted),
        }
    }
}

impl CompletionNotifier for BellNotifier {
    fn notify_complete(&self, goal: Option<&str>) -> Result<(), NotifyError> {
        if self.is_muted() {
            debug!("Completion notice muted");
            return Ok(());
        }

        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "{}{}", BELL, completion_message(goal))?;
        out.flush()?;
        Ok(())
    }

    fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::SeqCst);
    }
}

// ============================================================================
// MockNotifier
// ============================================================================

/// Notifier that records the goal of every delivered notice.
#[derive(Debug, Default)]
pub struct MockNotifier {
    calls: Mutex<Vec<Option<String>>>,
    muted: AtomicBool,
    should_fail: AtomicBool,
}

impl MockNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn notify_count(&self) -> usize {
        self.lock_calls().len()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<Option<String>> {
        self.lock_calls().clone()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<Option<String>>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CompletionNotifier for MockNotifier {
    fn notify_complete(&self, goal: Option<&str>) -> Result<(), NotifyError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(NotifyError::Output("Mock failure".to_string()));
        }
        if self.is_muted() {
            return Ok(());
        }
        self.lock_calls().push(goal.map(String::from));
        Ok(())
    }

    fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::SeqCst);
    }
}

// ============================================================================
// Tests
// ============================================================================
