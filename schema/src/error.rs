//! Schema validation errors.

use thiserror::Error;
use wire::Frequency;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur when building or validating a protocol table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two packets share one `(frequency, id)` wire identity.
    #[error("duplicate packet id {frequency} {id}: {first} and {second}")]
    DuplicatePacketId {
        frequency: Frequency,
        id: u16,
        first: String,
        second: String,
    },

    /// Two packets share one name.
    #[error("duplicate packet name {name}")]
    DuplicatePacketName { name: String },

    /// Two blocks in one packet share one name.
    #[error("duplicate block {block} in packet {packet}")]
    DuplicateBlockName { packet: String, block: String },

    /// Two fields in one block share one name.
    #[error("duplicate field {field} in {packet}.{block}")]
    DuplicateFieldName {
        packet: String,
        block: String,
        field: String,
    },

    /// Packet ID cannot be encoded in its frequency namespace.
    #[error("packet {packet} has id {id}, out of range for {frequency} frequency")]
    InvalidPacketId {
        packet: String,
        frequency: Frequency,
        id: u16,
    },

    /// Fixed-multiple block declared with fewer than two occurrences.
    #[error("block {packet}.{block} declares multiple count {count}, need at least 2")]
    InvalidMultipleCount {
        packet: String,
        block: String,
        count: usize,
    },

    /// Fixed-length field declared with zero length.
    #[error("field {packet}.{block}.{field} declares a zero-length fixed array")]
    ZeroLengthFixed {
        packet: String,
        block: String,
        field: String,
    },

    /// Block declares no fields.
    #[error("block {packet}.{block} has no fields")]
    EmptyBlock { packet: String, block: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_duplicate_packet_id() {
        let err = SchemaError::DuplicatePacketId {
            frequency: Frequency::Low,
            id: 7,
            first: "A".into(),
            second: "B".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Low 7"));
        assert!(msg.contains('A') && msg.contains('B'));
    }

    #[test]
    fn display_names_full_path() {
        let err = SchemaError::ZeroLengthFixed {
            packet: "P".into(),
            block: "B".into(),
            field: "F".into(),
        };
        assert!(err.to_string().contains("P.B.F"));
    }
}
