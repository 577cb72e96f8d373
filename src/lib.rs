//! Focus Timer Library
//!
//! This library provides a drift-corrected countdown timer. It includes:
//! - Shared value types for durations, decomposed time and status
//! - The message protocol between the timer worker and its manager
//! - The timer worker, hosted on its own thread and runtime
//! - The `TimerManager` facade with single-slot observers
//! - Saved state and preferences as JSON files
//! - Completion notification
//! - CLI command parsing, display and the foreground countdown shell

pub mod cli;
pub mod manager;
pub mod notification;
pub mod persistence;
pub mod protocol;
pub mod types;
pub mod worker;

// Re-export commonly used types for convenience
pub use types::{TimeParts, TimerSettings, TimerState, TimerStatus};

pub use protocol::{Command, Envelope, Event, EventPayload, MessageType, ProtocolError};

pub use worker::{spawn_worker, Clock, MockClock, SystemClock, WorkerHandle, WorkerOutput};

pub use manager::{TimerError, TimerManager};

pub use persistence::{
    JsonFileStore, MemoryStore, PersistedState, PersistenceError, Preferences, StateStore,
};

pub use notification::{BellNotifier, CompletionNotifier, MockNotifier, NotifyError};
