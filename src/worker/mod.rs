//! Timer worker: the isolated execution context that owns the countdown.
//!
//! This module contains:
//! - `clock`: wall-clock sources (system and mock)
//! - `state`: the countdown state and its transitions
//! - `engine`: the command/tick loop that turns state changes into events
//!
//! [`spawn_worker`] hosts a [`TimerEngine`] on its own OS thread with a
//! private single-threaded tokio runtime. The only way in or out is the
//! pair of channels returned with the [`WorkerHandle`].

pub mod clock;
pub mod engine;
pub mod state;

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::protocol::{Command, Envelope};

pub use clock::{Clock, MockClock, SystemClock};
pub use engine::{TimerEngine, TICK_INTERVAL};
pub use state::EngineState;

/// Name of the worker thread.
pub const WORKER_THREAD_NAME: &str = "focus-timer-worker";

// ============================================================================
// WorkerOutput
// ============================================================================

/// Everything the worker can deliver to the manager.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerOutput {
    /// A protocol event
    Message(Envelope),
    /// The worker context failed internally and stopped
    Fault(String),
}

// ============================================================================
// WorkerHandle
// ============================================================================

/// Manager-side handle to a running worker.
pub struct WorkerHandle {
    command_tx: mpsc::UnboundedSender<Envelope>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    /// Posts a command. Returns false if the worker is gone.
    pub fn send(&self, command: Command) -> bool {
        self.post(command.to_envelope())
    }

    /// Posts a raw envelope. Returns false if the worker is gone.
    pub fn post(&self, envelope: Envelope) -> bool {
        self.command_tx.send(envelope).is_ok()
    }

    /// Stops the worker without processing queued commands.
    ///
    /// Does not wait for the thread to exit. Safe to call repeatedly.
    pub fn terminate(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            // Err means the worker already exited
            let _ = shutdown_tx.send(());
            debug!("Timer worker termination requested");
        }
        self.thread = None;
    }

    /// Returns true once `terminate` was called or the worker thread exited.
    pub fn is_terminated(&self) -> bool {
        match &self.thread {
            Some(thread) => thread.is_finished(),
            None => true,
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.terminate();
    }
}

// ============================================================================
// spawn_worker
// ============================================================================

/// Starts a timer engine on a dedicated thread.
///
/// # Errors
///
/// Returns an error if the worker runtime or thread cannot be created.
pub fn spawn_worker<C: Clock>(
    clock: C,
) -> Result<(WorkerHandle, mpsc::UnboundedReceiver<WorkerOutput>)> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to build timer worker runtime")?;

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let fault_tx = event_tx.clone();

    let thread = thread::Builder::new()
        .name(WORKER_THREAD_NAME.to_string())
        .spawn(move || {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                runtime.block_on(async move {
                    let mut engine = TimerEngine::new(clock, event_tx);
                    engine.run(command_rx, shutdown_rx).await
                })
            }));

            let fault = match outcome {
                Ok(Ok(())) => return,
                Ok(Err(e)) => format!("{:#}", e),
                Err(panic) => format!("worker panicked: {}", panic_message(panic.as_ref())),
            };

            if fault_tx.send(WorkerOutput::Fault(fault.clone())).is_err() {
                debug!("Timer worker stopped after manager went away: {}", fault);
            } else {
                error!("Timer worker failed: {}", fault);
            }
        })
        .context("Failed to spawn timer worker thread")?;

    let handle = WorkerHandle {
        command_tx,
        shutdown_tx: Some(shutdown_tx),
        thread: Some(thread),
    };
    Ok((handle, event_rx))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Event;
    use crate::types::TimerSettings;
    use tokio::time::{timeout, Duration};

    async fn recv_event(rx: &mut mpsc::UnboundedReceiver<WorkerOutput>) -> Event {
        match timeout(Duration::from_secs(2), rx.recv()).await {
            Ok(Some(WorkerOutput::Message(envelope))) => Event::from_envelope(&envelope).unwrap(),
            other => panic!("expected an event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_worker_answers_status() {
        let (handle, mut events) = spawn_worker(SystemClock).unwrap();

        assert!(handle.send(Command::GetStatus));
        assert_eq!(recv_event(&mut events).await, Event::status(1500, false, false));
    }

    #[tokio::test]
    async fn test_worker_preserves_command_order() {
        let clock = MockClock::new(1_000_000);
        let (handle, mut events) = spawn_worker(clock).unwrap();

        handle.send(Command::Reset(TimerSettings::new(0, 5, 0)));
        handle.send(Command::SetTime(TimerSettings::new(0, 0, 40)));
        handle.send(Command::Start(TimerSettings::default()));
        handle.send(Command::Pause);

        assert_eq!(recv_event(&mut events).await, Event::status(300, false, false));
        assert_eq!(recv_event(&mut events).await, Event::status(40, false, false));
        // A start without payload counts the default duration, not the set one
        assert_eq!(recv_event(&mut events).await, Event::tick(1500));
        assert_eq!(recv_event(&mut events).await, Event::status(1500, false, true));
    }

    #[tokio::test]
    async fn test_terminate_closes_event_channel() {
        let (mut handle, mut events) = spawn_worker(SystemClock).unwrap();
        handle.send(Command::Start(TimerSettings::new(0, 0, 30)));
        let _ = recv_event(&mut events).await;

        handle.terminate();
        handle.terminate();
        assert!(handle.is_terminated());

        let closed = timeout(Duration::from_secs(2), async {
            loop {
                match events.recv().await {
                    Some(WorkerOutput::Message(_)) => continue,
                    other => return other,
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(closed, None);
        assert!(!handle.send(Command::GetStatus));
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");

        let boxed: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic payload");
    }
}
