//! Message protocol between the timer manager and the timer worker.
//!
//! Every message crossing the worker boundary is an [`Envelope`]:
//!
//! ```text
//! {"type": "START_TIMER", "payload": {"hours": 0, "minutes": 30, "seconds": 0}}
//! {"type": "TIMER_TICK",  "payload": {"hours": 0, "minutes": 29, "seconds": 59,
//!                                     "isRunning": true, "isCompleted": false,
//!                                     "remainingSeconds": 1799}}
//! ```
//!
//! [`Command`] is the typed view of the manager → worker direction and
//! [`Event`] of the worker → manager direction. Decoding a command never
//! fails on its payload (missing or malformed fields default), whereas an
//! event with a broken payload is rejected.

mod error;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{TimeParts, TimerSettings};

pub use error::ProtocolError;

// ============================================================================
// MessageType
// ============================================================================

/// All message kinds of the worker protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    StartTimer,
    PauseTimer,
    ResetTimer,
    GetStatus,
    SetTime,
    TimerTick,
    TimerStatus,
    TimerComplete,
}

impl MessageType {
    /// Returns the wire name of the message kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::StartTimer => "START_TIMER",
            MessageType::PauseTimer => "PAUSE_TIMER",
            MessageType::ResetTimer => "RESET_TIMER",
            MessageType::GetStatus => "GET_STATUS",
            MessageType::SetTime => "SET_TIME",
            MessageType::TimerTick => "TIMER_TICK",
            MessageType::TimerStatus => "TIMER_STATUS",
            MessageType::TimerComplete => "TIMER_COMPLETE",
        }
    }

    /// Parses a wire name.
    pub fn parse(name: &str) -> Option<Self> {
        let kind = match name {
            "START_TIMER" => MessageType::StartTimer,
            "PAUSE_TIMER" => MessageType::PauseTimer,
            "RESET_TIMER" => MessageType::ResetTimer,
            "GET_STATUS" => MessageType::GetStatus,
            "SET_TIME" => MessageType::SetTime,
            "TIMER_TICK" => MessageType::TimerTick,
            "TIMER_STATUS" => MessageType::TimerStatus,
            "TIMER_COMPLETE" => MessageType::TimerComplete,
            _ => return None,
        };
        Some(kind)
    }

    /// Returns true for manager → worker kinds.
    pub fn is_command(&self) -> bool {
        matches!(
            self,
            MessageType::StartTimer
                | MessageType::PauseTimer
                | MessageType::ResetTimer
                | MessageType::GetStatus
                | MessageType::SetTime
        )
    }

    /// Returns true for worker → manager kinds.
    pub fn is_event(&self) -> bool {
        !self.is_command()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// A single protocol message as it travels between contexts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Wire name of the message kind
    #[serde(rename = "type")]
    pub kind: String,
    /// Kind-specific payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Envelope {
    /// Creates an envelope for a known message kind.
    pub fn new(kind: MessageType, payload: Option<Value>) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            payload,
        }
    }

    /// Creates an envelope with an arbitrary kind string.
    pub fn raw(kind: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Returns the parsed message kind, if it is part of the protocol.
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::parse(&self.kind)
    }
}

// ============================================================================
// Command
// ============================================================================

/// Manager → worker command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start(TimerSettings),
    Pause,
    Reset(TimerSettings),
    SetTime(TimerSettings),
    GetStatus,
}

impl Command {
    /// Returns the message kind of this command.
    pub fn message_type(&self) -> MessageType {
        match self {
            Command::Start(_) => MessageType::StartTimer,
            Command::Pause => MessageType::PauseTimer,
            Command::Reset(_) => MessageType::ResetTimer,
            Command::SetTime(_) => MessageType::SetTime,
            Command::GetStatus => MessageType::GetStatus,
        }
    }

    /// Encodes the command. Empty settings produce no payload at all.
    pub fn to_envelope(&self) -> Envelope {
        let payload = match self {
            Command::Start(settings) | Command::Reset(settings) | Command::SetTime(settings) => {
                settings_to_payload(settings)
            }
            Command::Pause | Command::GetStatus => None,
        };
        Envelope::new(self.message_type(), payload)
    }

    /// Decodes a command. Only the kind can make this fail.
    pub fn from_envelope(envelope: &Envelope) -> Result<Self, ProtocolError> {
        let kind = envelope
            .message_type()
            .ok_or_else(|| ProtocolError::UnknownMessageType(envelope.kind.clone()))?;
        let settings = || settings_from_payload(envelope.payload.as_ref());

        let command = match kind {
            MessageType::StartTimer => Command::Start(settings()),
            MessageType::PauseTimer => Command::Pause,
            MessageType::ResetTimer => Command::Reset(settings()),
            MessageType::SetTime => Command::SetTime(settings()),
            MessageType::GetStatus => Command::GetStatus,
            MessageType::TimerTick | MessageType::TimerStatus | MessageType::TimerComplete => {
                return Err(ProtocolError::UnexpectedDirection(envelope.kind.clone()))
            }
        };
        Ok(command)
    }
}

fn settings_to_payload(settings: &TimerSettings) -> Option<Value> {
    if settings.is_empty() {
        return None;
    }

    let mut map = Map::new();
    let fields = [
        ("hours", settings.hours),
        ("minutes", settings.minutes),
        ("seconds", settings.seconds),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            map.insert(name.to_string(), Value::from(value));
        }
    }
    Some(Value::Object(map))
}

/// Reads each numeric field on its own; anything that is not a
/// non-negative integer is treated as missing.
fn settings_from_payload(payload: Option<&Value>) -> TimerSettings {
    let field = |name: &str| payload.and_then(|p| p.get(name)).and_then(Value::as_u64);
    TimerSettings {
        hours: field("hours"),
        minutes: field("minutes"),
        seconds: field("seconds"),
    }
}

// ============================================================================
// Event
// ============================================================================

/// Payload shared by all worker → manager events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub is_running: bool,
    /// Absent on tick events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_paused: Option<bool>,
    pub is_completed: bool,
    pub remaining_seconds: u64,
}

impl EventPayload {
    fn new(remaining_seconds: u64, is_running: bool, is_paused: Option<bool>) -> Self {
        let parts = TimeParts::from_seconds(remaining_seconds);
        Self {
            hours: parts.hours,
            minutes: parts.minutes,
            seconds: parts.seconds,
            is_running,
            is_paused,
            is_completed: remaining_seconds == 0,
            remaining_seconds,
        }
    }

    /// Returns the decomposed time carried by the payload.
    pub fn time_parts(&self) -> TimeParts {
        TimeParts {
            hours: self.hours,
            minutes: self.minutes,
            seconds: self.seconds,
        }
    }
}

/// Worker → manager event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Tick(EventPayload),
    Status(EventPayload),
    Complete(EventPayload),
}

impl Event {
    /// Tick for a running countdown.
    pub fn tick(remaining_seconds: u64) -> Self {
        Event::Tick(EventPayload::new(remaining_seconds, true, None))
    }

    /// Status snapshot.
    pub fn status(remaining_seconds: u64, is_running: bool, is_paused: bool) -> Self {
        Event::Status(EventPayload::new(
            remaining_seconds,
            is_running,
            Some(is_paused),
        ))
    }

    /// Completion; always all zeros with `isCompleted: true`.
    pub fn complete() -> Self {
        Event::Complete(EventPayload::new(0, false, Some(false)))
    }

    /// Returns the message kind of this event.
    pub fn message_type(&self) -> MessageType {
        match self {
            Event::Tick(_) => MessageType::TimerTick,
            Event::Status(_) => MessageType::TimerStatus,
            Event::Complete(_) => MessageType::TimerComplete,
        }
    }

    /// Returns the event payload.
    pub fn payload(&self) -> &EventPayload {
        match self {
            Event::Tick(payload) | Event::Status(payload) | Event::Complete(payload) => payload,
        }
    }

    /// Encodes the event.
    pub fn to_envelope(&self) -> Result<Envelope, ProtocolError> {
        let payload = serde_json::to_value(self.payload())
            .map_err(|e| ProtocolError::Serialization(e.to_string()))?;
        Ok(Envelope::new(self.message_type(), Some(payload)))
    }

    /// Decodes an event, rejecting unknown kinds, commands and bad payloads.
    pub fn from_envelope(envelope: &Envelope) -> Result<Self, ProtocolError> {
        let kind = envelope
            .message_type()
            .ok_or_else(|| ProtocolError::UnknownMessageType(envelope.kind.clone()))?;
        if kind.is_command() {
            return Err(ProtocolError::UnexpectedDirection(envelope.kind.clone()));
        }

        let invalid = |reason: String| ProtocolError::InvalidPayload {
            kind: envelope.kind.clone(),
            reason,
        };
        let value = envelope
            .payload
            .clone()
            .ok_or_else(|| invalid("missing payload".to_string()))?;
        let payload: EventPayload =
            serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;

        let event = match kind {
            MessageType::TimerTick => Event::Tick(payload),
            MessageType::TimerStatus => Event::Status(payload),
            _ => Event::Complete(payload),
        };
        Ok(event)
    }
}

// ============================================================================
// Tests
// ============================================================================
