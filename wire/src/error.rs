//! Error types for wire framing operations.

use thiserror::Error;

use crate::frequency::Frequency;

/// Result type for wire framing operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors that can occur while framing or splitting datagrams.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum WireError {
    /// Datagram is too small to contain the header it announces.
    #[error("datagram too small: {actual} bytes, need at least {required}")]
    DatagramTooSmall { actual: usize, required: usize },

    /// The message number bytes do not form a valid frequency-scoped ID.
    #[error("invalid message number: {reason}")]
    InvalidMessageNumber { reason: MessageNumberReason },

    /// Packet ID is not representable in its frequency namespace.
    #[error("packet id {id} is out of range for {frequency} frequency")]
    InvalidPacketId { frequency: Frequency, id: u16 },

    /// The appended acknowledgement trailer runs past the start of the body.
    #[error("appended ack list of {count} entries needs {needed} bytes, have {available}")]
    AppendedAcksTruncated {
        count: usize,
        needed: usize,
        available: usize,
    },

    /// Byte cursor error.
    #[error("byte cursor error: {0}")]
    Bytes(#[from] bytestream::ByteError),
}

/// Details for invalid message numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MessageNumberReason {
    /// High-frequency ID 0 is never assigned.
    #[error("high frequency id 0 is reserved")]
    ZeroHighId,
    /// Medium-frequency ID 0 or 0xFF (escape) after the medium prefix.
    #[error("medium frequency id {id} is reserved")]
    ReservedMediumId { id: u8 },
    /// Low-frequency ID 0 after the low prefix.
    #[error("low frequency id 0 is reserved")]
    ZeroLowId,
}
