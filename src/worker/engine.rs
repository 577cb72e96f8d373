//! Timer engine for the focus timer worker.
//!
//! This module provides the countdown state machine:
//! - Command handling (start, pause, reset, set time, status)
//! - A one-second tick source built on `tokio::time::interval`
//! - Drift-corrected tick and completion events

use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Duration, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::protocol::{Command, Envelope, Event};
use crate::types::TimerSettings;

use super::clock::Clock;
use super::state::EngineState;
use super::WorkerOutput;

/// Tick source period.
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);

// ============================================================================
// TimerEngine
// ============================================================================

/// Timer engine that owns the countdown state and emits protocol events.
pub struct TimerEngine<C: Clock> {
    /// Current countdown state
    state: EngineState,
    /// Wall clock used for all elapsed-time math
    clock: C,
    /// Armed tick source, at most one
    ticker: Option<Interval>,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<WorkerOutput>,
}

enum Step {
    Message(Option<Envelope>),
    Tick,
    Shutdown,
}

impl<C: Clock> TimerEngine<C> {
    /// Creates a stopped engine with the default 25 minute duration.
    pub fn new(clock: C, event_tx: mpsc::UnboundedSender<WorkerOutput>) -> Self {
        Self {
            state: EngineState::default(),
            clock,
            ticker: None,
            event_tx,
        }
    }

    /// Runs the worker loop.
    ///
    /// Commands are processed one at a time in arrival order. The loop ends
    /// when the command channel closes or `shutdown` resolves.
    pub async fn run(
        &mut self,
        mut command_rx: mpsc::UnboundedReceiver<Envelope>,
        mut shutdown: oneshot::Receiver<()>,
    ) -> Result<()> {
        info!("Timer worker started");

        loop {
            let step = tokio::select! {
                biased;
                _ = &mut shutdown => Step::Shutdown,
                message = command_rx.recv() => Step::Message(message),
                () = next_tick(&mut self.ticker) => Step::Tick,
            };

            match step {
                Step::Message(Some(envelope)) => self.handle_message(envelope)?,
                Step::Tick => self.on_tick()?,
                Step::Message(None) | Step::Shutdown => break,
            }
        }

        self.disarm();
        info!("Timer worker stopped");
        Ok(())
    }

    /// Decodes and applies one inbound message. Unknown kinds are ignored.
    pub fn handle_message(&mut self, envelope: Envelope) -> Result<()> {
        match Command::from_envelope(&envelope) {
            Ok(command) => self.handle_command(command),
            Err(e) => {
                warn!("Ignoring worker message: {}", e);
                Ok(())
            }
        }
    }

    /// Applies one command.
    pub fn handle_command(&mut self, command: Command) -> Result<()> {
        debug!(?command, "Worker received command");

        match command {
            Command::Start(settings) => self.start(settings),
            Command::Pause => self.pause(),
            Command::Reset(settings) => self.reset(settings),
            Command::SetTime(settings) => self.set_time(settings),
            Command::GetStatus => self.emit_status(),
        }
    }

    /// Starts or resumes the countdown.
    fn start(&mut self, settings: TimerSettings) -> Result<()> {
        if self.state.is_running {
            debug!("Start ignored: timer already running");
            return Ok(());
        }

        let remaining = self.state.resolve_start(settings.total_seconds());
        if remaining == 0 {
            return self.emit(Event::complete());
        }

        self.state.begin_run(self.clock.now_millis(), remaining);
        self.arm();
        info!(remaining_seconds = remaining, "Countdown started");

        self.emit(Event::tick(remaining))
    }

    fn pause(&mut self) -> Result<()> {
        if !self.state.pause(self.clock.now_millis()) {
            debug!("Pause ignored: timer not running");
            return Ok(());
        }

        self.disarm();
        info!(
            remaining_seconds = self.state.paused_remaining_seconds,
            "Countdown paused"
        );
        self.emit_status()
    }

    fn reset(&mut self, settings: TimerSettings) -> Result<()> {
        self.disarm();
        self.state.reset(settings.total_seconds());
        self.emit_status()
    }

    fn set_time(&mut self, settings: TimerSettings) -> Result<()> {
        if !self.state.set_duration(settings.total_seconds()) {
            debug!("Set time ignored: timer running");
            return Ok(());
        }
        self.emit_status()
    }

    /// Handles one fire of the tick source.
    fn on_tick(&mut self) -> Result<()> {
        if !self.state.is_running {
            self.disarm();
            return Ok(());
        }

        let remaining = self.state.running_remaining(self.clock.now_millis());
        if remaining == 0 {
            self.disarm();
            self.state.finish();
            info!("Countdown complete");
            return self.emit(Event::complete());
        }

        self.emit(Event::tick(remaining))
    }

    fn emit_status(&self) -> Result<()> {
        let remaining = self.state.remaining_seconds(self.clock.now_millis());
        self.emit(Event::status(
            remaining,
            self.state.is_running,
            self.state.is_paused,
        ))
    }

    fn emit(&self, event: Event) -> Result<()> {
        let envelope = event.to_envelope()?;
        self.event_tx
            .send(WorkerOutput::Message(envelope))
            .with_context(|| format!("Failed to send {} event", event.message_type()))?;
        Ok(())
    }

    /// Replaces any armed tick source; the first fire is one period out.
    fn arm(&mut self) {
        let mut ticker = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.ticker = Some(ticker);
    }

    fn disarm(&mut self) {
        self.ticker = None;
    }

    /// Returns a reference to the current countdown state.
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Returns true while a tick source is armed.
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

// ============================================================================
// Tests
// ============================================================================
