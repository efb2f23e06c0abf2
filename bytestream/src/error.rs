//! Error types for byte cursor operations.

use thiserror::Error;

/// Result type for byte cursor operations.
pub type ByteResult<T> = Result<T, ByteError>;

/// Errors that can occur during byte-level encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ByteError {
    /// Attempted to read past the end of the buffer.
    #[error("attempted to read {requested} bytes but only {available} bytes available")]
    UnexpectedEof {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// Attempted to write past the end of the output buffer.
    #[error("attempted to write {requested} bytes but only {available} bytes of capacity remain")]
    BufferOverflow {
        /// Number of bytes the write needed.
        requested: usize,
        /// Remaining capacity in bytes.
        available: usize,
    },

    /// Attempted to patch a byte that has not been written yet.
    #[error("cannot patch position {position}, only {written} bytes written")]
    PatchOutOfRange {
        /// Position that was targeted.
        position: usize,
        /// Number of bytes written so far.
        written: usize,
    },
}
