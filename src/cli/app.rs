//! Foreground countdown shell.
//!
//! Wires a [`TimerManager`] to a [`StateStore`] and a [`CompletionNotifier`]:
//!
//! - Resumes a recent saved countdown unless told to start fresh
//! - Redraws the remaining time on every tick and saves it periodically
//! - On interrupt, pauses the timer and saves it as paused
//! - On completion, notifies and discards the saved state
//!
//! Manager observers only forward events into a channel; all storage and
//! terminal output happens in [`run_countdown`] itself.

use std::future::Future;

use anyhow::{bail, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::commands::RunArgs;
use super::display::Display;
use crate::manager::TimerManager;
use crate::notification::CompletionNotifier;
use crate::persistence::{PersistedState, Preferences, StateStore};
use crate::types::{TimerSettings, TimerState, TimerStatus};

/// A running countdown is saved every this many ticks.
pub const SAVE_EVERY_TICKS: u64 = 15;

// ============================================================================
// Options and outcome
// ============================================================================

/// How to run one countdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Explicit duration; `None` uses the preferred one
    pub settings: Option<TimerSettings>,
    pub goal: Option<String>,
    pub mute: bool,
    /// Ignore any saved countdown
    pub fresh: bool,
}

impl From<&RunArgs> for RunOptions {
    fn from(args: &RunArgs) -> Self {
        Self {
            settings: args.settings(),
            goal: args.goal.clone(),
            mute: args.mute,
            fresh: args.fresh,
        }
    }
}

/// How a countdown ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The countdown reached zero
    Completed,
    /// The countdown was interrupted, paused and saved
    Paused { remaining_seconds: u64 },
}

// ============================================================================
// Session planning
// ============================================================================

/// What the shell is about to count down.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Session {
    settings: TimerSettings,
    /// Duration the user originally asked for
    duration: u64,
    goal: Option<String>,
    resumed: bool,
}

impl Session {
    fn snapshot(&self, remaining_seconds: u64, status: TimerStatus) -> PersistedState {
        PersistedState::new(
            remaining_seconds,
            self.duration,
            status,
            self.goal.clone().unwrap_or_default(),
        )
    }
}

/// Picks a saved countdown to resume, or a fresh one.
///
/// Explicit duration flags count as starting fresh.
fn plan_session(options: &RunOptions, store: &dyn StateStore, preferences: &Preferences) -> Session {
    let goal = options
        .goal
        .as_deref()
        .map(str::trim)
        .filter(|goal| !goal.is_empty())
        .map(String::from);

    if !options.fresh && options.settings.is_none() {
        if let Some(saved) = store.load_state().filter(PersistedState::is_resumable) {
            debug!(remaining = saved.time_remaining, "Resuming saved countdown");
            return Session {
                settings: saved.resume_settings(),
                duration: saved.user_set_duration,
                goal: goal.or_else(|| saved.goal().map(String::from)),
                resumed: true,
            };
        }
    }

    let settings = options
        .settings
        .unwrap_or_else(|| preferences.preferred_settings());
    Session {
        settings,
        duration: settings.total_seconds(),
        goal: goal.or_else(|| preferences.goal().map(String::from)),
        resumed: false,
    }
}

// ============================================================================
// run_countdown
// ============================================================================

enum UiEvent {
    Tick(TimerState),
    Status(TimerStatus),
    Complete,
}

fn forward_events(manager: &TimerManager, tx: mpsc::UnboundedSender<UiEvent>) {
    // A closed receiver means the shell has already finished
    let tick_tx = tx.clone();
    manager.on_tick(move |state| {
        let _ = tick_tx.send(UiEvent::Tick(state));
    });
    let complete_tx = tx.clone();
    manager.on_complete(move || {
        let _ = complete_tx.send(UiEvent::Complete);
    });
    manager.on_status_change(move |status| {
        let _ = tx.send(UiEvent::Status(status));
    });
}

/// Runs one countdown until it completes or `interrupt` resolves.
///
/// The manager is destroyed before returning.
///
/// # Errors
///
/// Returns an error if the manager stops delivering events.
pub async fn run_countdown<F>(
    mut manager: TimerManager,
    store: &dyn StateStore,
    notifier: &dyn CompletionNotifier,
    options: RunOptions,
    interrupt: F,
) -> Result<RunOutcome>
where
    F: Future<Output = ()>,
{
    let preferences = store.load_preferences();
    if options.mute || preferences.is_muted {
        notifier.set_muted(true);
    }

    let session = plan_session(&options, store, &preferences);
    let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();
    forward_events(&manager, ui_tx);

    let goal = session.goal.as_deref();
    if session.resumed {
        Display::show_resumed(session.settings.total_seconds(), goal);
    } else {
        Display::show_started(session.duration, goal);
    }
    info!(
        seconds = session.settings.total_seconds(),
        resumed = session.resumed,
        "Starting countdown"
    );
    manager.start_timer(Some(session.settings));

    tokio::pin!(interrupt);
    let mut ticks: u64 = 0;
    let outcome = loop {
        tokio::select! {
            event = ui_rx.recv() => match event {
                Some(UiEvent::Tick(state)) => {
                    Display::show_tick(&state);
                    if ticks % SAVE_EVERY_TICKS == 0 {
                        store.save_state(
                            &session.snapshot(state.remaining_seconds(), TimerStatus::Running),
                        );
                    }
                    ticks += 1;
                }
                Some(UiEvent::Status(status)) => debug!(%status, "Timer status changed"),
                Some(UiEvent::Complete) => break finish(store, notifier, &session),
                None => bail!("Timer stopped delivering events"),
            },
            () = &mut interrupt => {
                info!("Interrupted; pausing countdown");
                break pause_and_save(&manager, &mut ui_rx, store, notifier, &session).await?;
            }
        }
    };

    manager.destroy();
    Ok(outcome)
}

async fn pause_and_save(
    manager: &TimerManager,
    ui_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    store: &dyn StateStore,
    notifier: &dyn CompletionNotifier,
    session: &Session,
) -> Result<RunOutcome> {
    manager.pause_timer();
    // Always answered, even if the pause was a no-op
    manager.request_current_status();

    loop {
        match ui_rx.recv().await {
            Some(UiEvent::Tick(_)) => continue,
            Some(UiEvent::Status(_)) => break,
            Some(UiEvent::Complete) => return Ok(finish(store, notifier, session)),
            None => bail!("Timer stopped delivering events"),
        }
    }

    let state = manager.get_current_state();
    if state.status() == TimerStatus::Completed {
        return Ok(finish(store, notifier, session));
    }

    let remaining_seconds = state.remaining_seconds();
    store.save_state(&session.snapshot(remaining_seconds, TimerStatus::Paused));
    Display::finish_line();
    Display::show_paused(remaining_seconds);
    Ok(RunOutcome::Paused { remaining_seconds })
}

fn finish(store: &dyn StateStore, notifier: &dyn CompletionNotifier, session: &Session) -> RunOutcome {
    Display::finish_line();
    Display::show_completed(session.duration);
    if let Err(e) = notifier.notify_complete(session.goal.as_deref()) {
        warn!("Completion notice failed: {}", e);
    }
    store.clear_state();
    RunOutcome::Completed
}

// ============================================================================
// Tests
// ============================================================================
