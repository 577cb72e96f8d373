//! Timer manager: the application-facing facade over the timer worker.
//!
//! The manager owns one worker for its whole lifetime. Command methods post
//! a message and return at once; their effect shows up later, when the
//! worker's events arrive and are mirrored into [`TimerState`].
//!
//! ```text
//! app ──start_timer()──▶ TimerManager ──START_TIMER──▶ worker thread
//!  ▲                         │  ▲                          │
//!  └──── observers ◀─────────┘  └──── TIMER_TICK ──────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use focus_timer::manager::TimerManager;
//! use focus_timer::types::TimerSettings;
//!
//! # async fn demo() -> Result<(), focus_timer::manager::TimerError> {
//! let mut manager = TimerManager::new()?;
//! manager.on_tick(|state| println!("{}", state.formatted()));
//! manager.on_complete(|| println!("done"));
//! manager.start_timer(Some(TimerSettings::new(0, 25, 0)));
//! // ...
//! manager.destroy();
//! # Ok(())
//! # }
//! ```

mod error;
mod observers;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::protocol::{Command, Envelope, Event, EventPayload};
use crate::types::{TimerSettings, TimerState, TimerStatus};
use crate::worker::{spawn_worker, Clock, SystemClock, WorkerHandle, WorkerOutput};

pub use error::TimerError;

use observers::Observers;

// ============================================================================
// Shared
// ============================================================================

/// State touched by both the manager and its dispatcher task.
struct Shared {
    state: Mutex<TimerState>,
    observers: Observers,
    destroyed: AtomicBool,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: Mutex::new(TimerState::default()),
            observers: Observers::default(),
            destroyed: AtomicBool::new(false),
        }
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    fn current_state(&self) -> TimerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mirror(&self, payload: &EventPayload) -> TimerState {
        let state = TimerState {
            hours: payload.hours,
            minutes: payload.minutes,
            seconds: payload.seconds,
            is_running: payload.is_running,
            is_paused: payload.is_paused.unwrap_or(false),
            is_completed: payload.is_completed,
        };
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
        state
    }

    fn handle_output(&self, output: WorkerOutput) {
        match output {
            WorkerOutput::Message(envelope) => self.handle_message(envelope),
            WorkerOutput::Fault(reason) => {
                if !self.is_destroyed() {
                    let err = TimerError::Transport(reason);
                    error!("{}", err);
                }
            }
        }
    }

    fn handle_message(&self, envelope: Envelope) {
        if self.is_destroyed() {
            debug!("Dropping {} received after destroy", envelope.kind);
            return;
        }

        let event = match Event::from_envelope(&envelope) {
            Ok(event) => event,
            Err(e) => {
                warn!("Ignoring worker message: {}", e);
                return;
            }
        };
        debug!(kind = %event.message_type(), "Manager received event");

        match event {
            Event::Tick(payload) => {
                let state = self.mirror(&payload);
                if let Some(observer) = self.observers.tick.get() {
                    observer(state);
                }
            }
            Event::Status(payload) => {
                let state = self.mirror(&payload);
                if let Some(observer) = self.observers.status.get() {
                    observer(state.status());
                }
            }
            Event::Complete(payload) => {
                self.mirror(&payload);
                if let Some(observer) = self.observers.complete.get() {
                    observer();
                }
                if let Some(observer) = self.observers.status.get() {
                    observer(TimerStatus::Completed);
                }
            }
        }
    }

    fn on_disconnected(&self) {
        if !self.is_destroyed() {
            error!("Timer worker terminated unexpectedly; keeping last known state");
        }
    }
}

// ============================================================================
// TimerManager
// ============================================================================

/// Facade that exposes the worker through a synchronous API.
pub struct TimerManager {
    worker: Option<WorkerHandle>,
    shared: Arc<Shared>,
    dispatcher: Option<JoinHandle<()>>,
}

impl TimerManager {
    /// Creates a manager backed by a worker using the system clock.
    ///
    /// Must be called from within a tokio runtime; the runtime hosts the
    /// task that delivers worker events.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::Initialization`] if there is no runtime or the
    /// worker cannot be started.
    pub fn new() -> Result<Self, TimerError> {
        Self::with_clock(SystemClock)
    }

    /// Creates a manager whose worker reads time from `clock`.
    ///
    /// # Errors
    ///
    /// Same as [`TimerManager::new`].
    pub fn with_clock<C: Clock>(clock: C) -> Result<Self, TimerError> {
        let runtime = Handle::try_current().map_err(|e| {
            TimerError::Initialization(format!("no tokio runtime for event delivery: {}", e))
        })?;

        let (worker, mut events) =
            spawn_worker(clock).map_err(|e| TimerError::Initialization(format!("{:#}", e)))?;

        let shared = Arc::new(Shared::new());
        let dispatch = Arc::clone(&shared);
        let dispatcher = runtime.spawn(async move {
            while let Some(output) = events.recv().await {
                dispatch.handle_output(output);
            }
            dispatch.on_disconnected();
        });

        info!("Timer manager initialized");
        Ok(Self {
            worker: Some(worker),
            shared,
            dispatcher: Some(dispatcher),
        })
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Starts the countdown, or resumes it if it was paused.
    ///
    /// `None` starts the default 25 minutes.
    pub fn start_timer(&self, settings: Option<TimerSettings>) {
        self.send(Command::Start(settings.unwrap_or_default()));
    }

    /// Pauses a running countdown.
    pub fn pause_timer(&self) {
        self.send(Command::Pause);
    }

    /// Stops the countdown and sets a new duration.
    pub fn reset_timer(&self, settings: Option<TimerSettings>) {
        self.send(Command::Reset(settings.unwrap_or_default()));
    }

    /// Changes the duration while the countdown is not running.
    pub fn set_timer_duration(&self, settings: TimerSettings) {
        self.send(Command::SetTime(settings));
    }

    /// Asks the worker for a fresh status event.
    pub fn request_current_status(&self) {
        self.send(Command::GetStatus);
    }

    fn send(&self, command: Command) {
        let kind = command.message_type();
        let Some(worker) = &self.worker else {
            warn!("Timer manager destroyed; dropping {}", kind);
            return;
        };

        debug!(?command, "Sending command to worker");
        if !worker.send(command) {
            warn!("Timer worker unavailable; dropping {}", kind);
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Returns a copy of the mirrored state.
    pub fn get_current_state(&self) -> TimerState {
        self.shared.current_state()
    }

    /// Returns the status derived from the mirrored state.
    pub fn get_timer_status(&self) -> TimerStatus {
        self.shared.current_state().status()
    }

    /// Returns the mirrored time as `HH:MM:SS`.
    pub fn get_formatted_time_string(&self) -> String {
        self.shared.current_state().formatted()
    }

    /// Returns true after [`TimerManager::destroy`].
    pub fn is_destroyed(&self) -> bool {
        self.shared.is_destroyed()
    }

    // ------------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------------

    /// Sets the tick observer, replacing any previous one.
    pub fn on_tick<F>(&self, observer: F)
    where
        F: Fn(TimerState) + Send + Sync + 'static,
    {
        self.shared.observers.tick.replace(Arc::new(observer));
    }

    /// Sets the completion observer, replacing any previous one.
    pub fn on_complete<F>(&self, observer: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.observers.complete.replace(Arc::new(observer));
    }

    /// Sets the status-change observer, replacing any previous one.
    pub fn on_status_change<F>(&self, observer: F)
    where
        F: Fn(TimerStatus) + Send + Sync + 'static,
    {
        self.shared.observers.status.replace(Arc::new(observer));
    }

    // ------------------------------------------------------------------------
    // Event delivery
    // ------------------------------------------------------------------------

    /// Applies one worker message as if the worker had just delivered it.
    ///
    /// The dispatcher task calls this for every event; it is public so an
    /// embedding application can feed frames from its own transport.
    pub fn handle_worker_message(&self, envelope: Envelope) {
        self.shared.handle_message(envelope);
    }

    // ------------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------------

    /// Terminates the worker and clears every observer.
    ///
    /// No observer runs after this returns. Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.shared.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }

        self.shared.observers.clear();
        if let Some(mut worker) = self.worker.take() {
            worker.terminate();
        }
        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher.abort();
        }
        info!("Timer manager destroyed");
    }
}

impl Drop for TimerManager {
    fn drop(&mut self) {
        self.destroy();
    }
}

// ============================================================================
// Tests
// ============================================================================
