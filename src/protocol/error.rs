//! Protocol error types.
//!
//! None of these are fatal: both sides of the channel log them and move on
//! to the next message.

use thiserror::Error;

/// Errors raised while decoding or encoding a protocol envelope.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The envelope's `type` is not part of the protocol.
    #[error("Unknown message type: {0}")]
    UnknownMessageType(String),

    /// The `type` is valid but not meant for this side of the channel.
    #[error("Unexpected message type for this receiver: {0}")]
    UnexpectedDirection(String),

    /// An event payload is missing or does not match the event schema.
    #[error("Invalid payload for {kind}: {reason}")]
    InvalidPayload { kind: String, reason: String },

    /// A payload could not be serialized.
    #[error("Failed to serialize payload: {0}")]
    Serialization(String),
}

impl ProtocolError {
    /// Returns true if the message type was not recognized at all.
    #[must_use]
    pub fn is_unknown_type(&self) -> bool {
        matches!(self, Self::UnknownMessageType(_))
    }

    /// Returns true if the message travelled in the wrong direction.
    #[must_use]
    pub fn is_unexpected_direction(&self) -> bool {
        matches!(self, Self::UnexpectedDirection(_))
    }
}
