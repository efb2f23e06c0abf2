//! Error types for codec operations.

use std::fmt;

use bytestream::ByteError;
use thiserror::Error;
use wire::{Frequency, WireError};

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding packets.
///
/// Every variant is recoverable: a decode error means "drop this datagram",
/// an encode error means the caller must restructure the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// Wire framing error.
    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    /// Byte cursor error.
    #[error("byte cursor error: {0}")]
    Bytes(#[from] ByteError),

    /// Variable-length data is longer than its length prefix can announce.
    #[error("field {field}: {len} bytes exceed the {max}-byte limit of its length prefix")]
    Overflow {
        field: String,
        len: usize,
        max: usize,
    },

    /// Packet is larger than the MTU and its layout cannot be split.
    #[error("packet {packet} is {len} bytes and cannot be fragmented: {reason}")]
    Unfragmentable {
        packet: String,
        len: usize,
        reason: UnfragmentableReason,
    },

    /// One variable-block occurrence cannot fit in any fragment.
    #[error(
        "occurrence {index} of {packet}.{block} is {len} bytes, a fragment has room for {capacity}"
    )]
    OccurrenceTooLarge {
        packet: String,
        block: String,
        index: usize,
        len: usize,
        capacity: usize,
    },

    /// No packet is defined for this wire identity.
    #[error("unknown packet type {frequency} {id}")]
    UnknownPacketType { frequency: Frequency, id: u16 },

    /// Body ended before the layout was satisfied.
    #[error("packet {packet} truncated in block {block}: need {needed} bytes, have {available}")]
    TruncatedPacket {
        packet: String,
        block: String,
        needed: usize,
        available: usize,
    },

    /// Header identity does not match the packet layout it is encoded with.
    #[error("header {frequency} {id} does not identify packet {packet}")]
    HeaderMismatch {
        packet: String,
        frequency: Frequency,
        id: u16,
    },

    /// Instance has a different number of blocks than its layout.
    #[error("packet {packet} has {expected} blocks, instance has {actual}")]
    BlockCountMismatch {
        packet: String,
        expected: usize,
        actual: usize,
    },

    /// Block occurrence count violates its cardinality.
    #[error("block {block} expects {expected}, instance has {actual} occurrences")]
    CardinalityMismatch {
        block: String,
        expected: ExpectedOccurrences,
        actual: usize,
    },

    /// Occurrence has a different number of fields than its block.
    #[error("block {block} has {expected} fields, occurrence has {actual}")]
    FieldCountMismatch {
        block: String,
        expected: usize,
        actual: usize,
    },

    /// Value does not fit its field definition.
    #[error("field {field}: {reason}")]
    InvalidValue { field: String, reason: ValueReason },

    /// A protocol table has already been installed for this process.
    #[error("a protocol table is already installed")]
    ProtocolAlreadyInstalled,

    /// Structured data does not match the packet layout.
    #[error("structured data at {path}: {reason}")]
    Structured { path: String, reason: String },
}

/// Why a packet cannot be split across datagrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnfragmentableReason {
    /// A single or fixed-multiple block follows a variable block.
    TrailingFixedBlock,
    /// Header and fixed blocks alone exceed the MTU.
    FixedPrefixExceedsMtu { prefix: usize, mtu: usize },
}

impl fmt::Display for UnfragmentableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrailingFixedBlock => write!(f, "a fixed block follows a variable block"),
            Self::FixedPrefixExceedsMtu { prefix, mtu } => {
                write!(f, "fixed prefix of {prefix} bytes exceeds mtu {mtu}")
            }
        }
    }
}

/// Occurrence count a block requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedOccurrences {
    Exactly(usize),
    AtMost(usize),
}

impl fmt::Display for ExpectedOccurrences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(count) => write!(f, "exactly {count}"),
            Self::AtMost(count) => write!(f, "at most {count}"),
        }
    }
}

/// Details for invalid field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueReason {
    /// Value variant does not match the field type.
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// Fixed array has the wrong length.
    FixedLength { expected: usize, actual: usize },
}

impl fmt::Display for ValueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch { expected, found } => {
                write!(f, "expected {expected} value, found {found}")
            }
            Self::FixedLength { expected, actual } => {
                write!(f, "fixed array needs {expected} bytes, got {actual}")
            }
        }
    }
}
