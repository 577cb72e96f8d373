//! Countdown state owned by the timer worker.
//!
//! All remaining-time values are derived from `start_timestamp` and the
//! current wall-clock reading; nothing here is decremented per tick.

use crate::types::DEFAULT_DURATION_SECONDS;

/// Milliseconds per second.
const MILLIS_IN_SECOND: u64 = 1000;

/// Authoritative countdown state.
///
/// Invariants: `is_running` and `is_paused` are never both true, and a
/// positive `paused_remaining_seconds` implies `!is_running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineState {
    /// Wall-clock start of the current run segment (epoch ms); 0 when unset
    pub start_timestamp: u64,
    /// Length of the current run segment in seconds
    pub total_duration_seconds: u64,
    pub is_running: bool,
    pub is_paused: bool,
    /// Remainder captured by the last pause; 0 when not paused
    pub paused_remaining_seconds: u64,
}

impl Default for EngineState {
    fn default() -> Self {
        Self::stopped(DEFAULT_DURATION_SECONDS)
    }
}

impl EngineState {
    /// Creates a stopped state counting down `total_duration_seconds`.
    pub fn stopped(total_duration_seconds: u64) -> Self {
        Self {
            start_timestamp: 0,
            total_duration_seconds,
            is_running: false,
            is_paused: false,
            paused_remaining_seconds: 0,
        }
    }

    /// Whole seconds since the segment started. A clock behind the start
    /// timestamp counts as no time elapsed.
    pub fn elapsed_seconds(&self, now_millis: u64) -> u64 {
        now_millis.saturating_sub(self.start_timestamp) / MILLIS_IN_SECOND
    }

    /// Drift-corrected remainder of the running segment.
    pub fn running_remaining(&self, now_millis: u64) -> u64 {
        self.total_duration_seconds
            .saturating_sub(self.elapsed_seconds(now_millis))
    }

    /// Remaining time as reported in status events.
    pub fn remaining_seconds(&self, now_millis: u64) -> u64 {
        if self.is_running {
            self.running_remaining(now_millis)
        } else if self.paused_remaining_seconds > 0 {
            self.paused_remaining_seconds
        } else {
            self.total_duration_seconds
        }
    }

    /// Picks the seconds a start should count: a pending pause remainder
    /// wins over the requested duration.
    pub fn resolve_start(&self, requested_seconds: u64) -> u64 {
        if self.paused_remaining_seconds > 0 {
            self.paused_remaining_seconds
        } else {
            requested_seconds
        }
    }

    /// Begins a run segment of `remaining_seconds` at `now_millis`.
    pub fn begin_run(&mut self, now_millis: u64, remaining_seconds: u64) {
        self.start_timestamp = now_millis;
        self.total_duration_seconds = remaining_seconds;
        self.is_running = true;
        self.is_paused = false;
        self.paused_remaining_seconds = 0;
        self.debug_check();
    }

    /// Captures the remainder and halts. Returns false if not running.
    pub fn pause(&mut self, now_millis: u64) -> bool {
        if !self.is_running {
            return false;
        }
        self.paused_remaining_seconds = self.running_remaining(now_millis);
        self.is_running = false;
        self.is_paused = true;
        self.debug_check();
        true
    }

    /// Replaces the whole state with a stopped one.
    pub fn reset(&mut self, total_duration_seconds: u64) {
        *self = Self::stopped(total_duration_seconds);
    }

    /// Changes the duration while not running. Returns false if running.
    pub fn set_duration(&mut self, total_duration_seconds: u64) -> bool {
        if self.is_running {
            return false;
        }
        self.total_duration_seconds = total_duration_seconds;
        self.paused_remaining_seconds = 0;
        self.is_paused = false;
        self.debug_check();
        true
    }

    /// Ends the run after the countdown reached zero.
    pub fn finish(&mut self) {
        self.is_running = false;
        self.is_paused = false;
        self.paused_remaining_seconds = 0;
    }

    fn debug_check(&self) {
        debug_assert!(!(self.is_running && self.is_paused));
        debug_assert!(self.paused_remaining_seconds == 0 || !self.is_running);
    }
}

// ============================================================================
// Tests
// ============================================================================
