//! Integration tests for the timer manager driving a real worker thread.
//!
//! Time is simulated with `MockClock`; only the periodic tick itself runs on
//! real time, so tests that wait for a periodic tick take about a second.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use focus_timer::manager::TimerManager;
use focus_timer::protocol::Envelope;
use focus_timer::types::{TimerSettings, TimerState, TimerStatus};
use focus_timer::worker::MockClock;

const T0: u64 = 1_700_000_000_000;

// ============================================================================
// Test Helpers
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Observed {
    Tick(TimerState),
    Status(TimerStatus),
    Complete,
}

/// Creates a manager on a mock clock with every observer forwarded to a channel.
fn observed_manager() -> (TimerManager, MockClock, mpsc::UnboundedReceiver<Observed>) {
    let clock = MockClock::new(T0);
    let manager = TimerManager::with_clock(clock.clone()).unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    let tick_tx = tx.clone();
    manager.on_tick(move |state| {
        let _ = tick_tx.send(Observed::Tick(state));
    });
    let complete_tx = tx.clone();
    manager.on_complete(move || {
        let _ = complete_tx.send(Observed::Complete);
    });
    manager.on_status_change(move |status| {
        let _ = tx.send(Observed::Status(status));
    });

    (manager, clock, rx)
}

async fn next(rx: &mut mpsc::UnboundedReceiver<Observed>) -> Observed {
    timeout(Duration::from_secs(3), rx.recv())
        .await
        .expect("timed out waiting for an observer call")
        .expect("observer channel closed")
}

async fn next_tick(rx: &mut mpsc::UnboundedReceiver<Observed>) -> TimerState {
    match next(rx).await {
        Observed::Tick(state) => state,
        other => panic!("expected tick, got {:?}", other),
    }
}

async fn next_status(rx: &mut mpsc::UnboundedReceiver<Observed>) -> TimerStatus {
    match next(rx).await {
        Observed::Status(status) => status,
        other => panic!("expected status, got {:?}", other),
    }
}

// ============================================================================
// Start
// ============================================================================

mod start_tests {
    use super::*;

    #[tokio::test]
    async fn test_start_emits_immediate_tick_with_full_duration() {
        let (manager, _clock, mut rx) = observed_manager();

        manager.start_timer(Some(TimerSettings::new(1, 2, 3)));

        let state = next_tick(&mut rx).await;
        assert_eq!((state.hours, state.minutes, state.seconds), (1, 2, 3));
        assert_eq!(state.remaining_seconds(), 3723);
        assert!(state.is_running);
        assert_eq!(manager.get_timer_status(), TimerStatus::Running);
        assert_eq!(manager.get_formatted_time_string(), "01:02:03");
    }

    #[tokio::test]
    async fn test_start_without_settings_uses_default_duration() {
        let (manager, _clock, mut rx) = observed_manager();

        manager.start_timer(None);

        assert_eq!(next_tick(&mut rx).await.remaining_seconds(), 1500);
    }

    #[tokio::test]
    async fn test_start_while_running_does_not_tick_again() {
        let (manager, _clock, mut rx) = observed_manager();

        manager.start_timer(Some(TimerSettings::new(0, 1, 0)));
        next_tick(&mut rx).await;

        manager.start_timer(Some(TimerSettings::new(0, 2, 0)));
        manager.request_current_status();

        // The status answer is the next event: no second immediate tick
        assert_eq!(next_status(&mut rx).await, TimerStatus::Running);
        assert_eq!(manager.get_current_state().remaining_seconds(), 60);
    }

    #[tokio::test]
    async fn test_zero_duration_completes_without_tick() {
        let (manager, _clock, mut rx) = observed_manager();

        manager.start_timer(Some(TimerSettings::new(0, 0, 0)));

        assert_eq!(next(&mut rx).await, Observed::Complete);
        assert_eq!(next_status(&mut rx).await, TimerStatus::Completed);
        assert_eq!(manager.get_timer_status(), TimerStatus::Completed);
        assert_eq!(manager.get_formatted_time_string(), "00:00:00");
    }
}

// ============================================================================
// Pause and resume
// ============================================================================

mod pause_resume_tests {
    use super::*;

    #[tokio::test]
    async fn test_pause_resume_round_trip() {
        let (manager, clock, mut rx) = observed_manager();

        manager.start_timer(Some(TimerSettings::new(0, 1, 0)));
        assert_eq!(next_tick(&mut rx).await.remaining_seconds(), 60);

        clock.advance(Duration::from_secs(10));
        manager.pause_timer();

        assert_eq!(next_status(&mut rx).await, TimerStatus::Paused);
        let paused = manager.get_current_state();
        assert_eq!(paused.remaining_seconds(), 50);
        assert!(paused.is_paused);
        assert!(!paused.is_running);

        // Time passing while paused does not count
        clock.advance(Duration::from_secs(30));
        manager.start_timer(None);

        let resumed = next_tick(&mut rx).await;
        assert_eq!(resumed.remaining_seconds(), 50);
        assert!(!resumed.is_paused);
        assert_eq!(manager.get_timer_status(), TimerStatus::Running);
    }

    #[tokio::test]
    async fn test_pause_when_not_running_is_ignored() {
        let (manager, _clock, mut rx) = observed_manager();

        manager.pause_timer();
        manager.request_current_status();

        assert_eq!(next_status(&mut rx).await, TimerStatus::Stopped);
        assert_eq!(manager.get_formatted_time_string(), "00:25:00");
    }
}

// ============================================================================
// Reset and set duration
// ============================================================================

mod reset_tests {
    use super::*;

    #[tokio::test]
    async fn test_reset_from_running() {
        let (manager, _clock, mut rx) = observed_manager();

        manager.start_timer(Some(TimerSettings::new(0, 1, 0)));
        next_tick(&mut rx).await;

        manager.reset_timer(Some(TimerSettings::new(0, 5, 0)));

        assert_eq!(next_status(&mut rx).await, TimerStatus::Stopped);
        let state = manager.get_current_state();
        assert_eq!((state.hours, state.minutes, state.seconds), (0, 5, 0));
        assert!(!state.is_running);
    }

    #[tokio::test]
    async fn test_reset_from_paused_then_start_uses_new_duration() {
        let (manager, clock, mut rx) = observed_manager();

        manager.start_timer(Some(TimerSettings::new(0, 1, 0)));
        next_tick(&mut rx).await;
        clock.advance(Duration::from_secs(10));
        manager.pause_timer();
        next_status(&mut rx).await;

        manager.reset_timer(Some(TimerSettings::new(0, 5, 0)));
        assert_eq!(next_status(&mut rx).await, TimerStatus::Stopped);

        manager.start_timer(Some(TimerSettings::new(0, 5, 0)));
        assert_eq!(next_tick(&mut rx).await.remaining_seconds(), 300);
    }

    #[tokio::test]
    async fn test_set_duration_while_running_is_ignored() {
        let (manager, _clock, mut rx) = observed_manager();

        manager.start_timer(Some(TimerSettings::new(0, 1, 0)));
        next_tick(&mut rx).await;

        manager.set_timer_duration(TimerSettings::new(1, 0, 0));
        manager.request_current_status();

        assert_eq!(next_status(&mut rx).await, TimerStatus::Running);
        assert_eq!(manager.get_current_state().remaining_seconds(), 60);
    }

    #[tokio::test]
    async fn test_set_duration_while_stopped() {
        let (manager, _clock, mut rx) = observed_manager();

        manager.set_timer_duration(TimerSettings::new(0, 0, 45));

        assert_eq!(next_status(&mut rx).await, TimerStatus::Stopped);
        assert_eq!(manager.get_formatted_time_string(), "00:00:45");
    }
}

// ============================================================================
// Completion
// ============================================================================

mod completion_tests {
    use super::*;

    #[tokio::test]
    async fn test_periodic_tick_detects_completion() {
        let (manager, clock, mut rx) = observed_manager();

        manager.start_timer(Some(TimerSettings::new(0, 0, 2)));
        assert_eq!(next_tick(&mut rx).await.remaining_seconds(), 2);

        // One periodic tick later the wall clock is already past the end
        clock.advance(Duration::from_secs(5));

        assert_eq!(next(&mut rx).await, Observed::Complete);
        assert_eq!(next_status(&mut rx).await, TimerStatus::Completed);
        let state = manager.get_current_state();
        assert!(state.is_completed);
        assert!(!state.is_running);
        assert_eq!(state.remaining_seconds(), 0);
    }

    #[tokio::test]
    async fn test_periodic_tick_reports_drift_corrected_time() {
        let (manager, clock, mut rx) = observed_manager();

        manager.start_timer(Some(TimerSettings::new(0, 1, 0)));
        next_tick(&mut rx).await;

        // A long stall: the next tick reflects wall-clock time, not tick count
        clock.advance(Duration::from_secs(42));

        assert_eq!(next_tick(&mut rx).await.remaining_seconds(), 18);
        assert!(manager.get_current_state().is_running);
    }
}

// ============================================================================
// Destroy
// ============================================================================

mod destroy_tests {
    use super::*;

    #[tokio::test]
    async fn test_no_observer_runs_after_destroy() {
        let clock = MockClock::new(T0);
        let mut manager = TimerManager::with_clock(clock).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        manager.on_tick(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = Arc::clone(&calls);
        manager.on_status_change(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        manager.start_timer(Some(TimerSettings::new(0, 0, 30)));
        manager.destroy();
        manager.destroy();

        tokio::time::sleep(Duration::from_millis(1500)).await;
        manager.start_timer(None);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(manager.is_destroyed());
    }

    #[tokio::test]
    async fn test_unknown_message_does_not_disturb_live_manager() {
        let (manager, _clock, mut rx) = observed_manager();

        manager.handle_worker_message(Envelope::raw("TIMER_EXPLODED", None));
        manager.start_timer(Some(TimerSettings::new(0, 0, 10)));

        assert_eq!(next_tick(&mut rx).await.remaining_seconds(), 10);
    }
}
