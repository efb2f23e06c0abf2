//! Packet, block and field schema definitions for the lludp codec.
//!
//! This crate describes how simulator messages are laid out on the wire:
//! - Field types and their encoded widths
//! - Blocks with single, fixed-multiple or variable cardinality
//! - Packets with a frequency-scoped ID and header flags
//! - A validated protocol table with a deterministic fingerprint
//!
//! # Design Principles
//!
//! - **Protocol as data** - One generic codec walks these tables; nothing is generated.
//! - **Validated once** - A [`Protocol`] is checked at construction and immutable after.
//! - **Deterministic hashing** - The fingerprint is stable given the same definition.
//!
//! With the `serde` feature a [`Protocol`] loads from any serde format as an
//! array of packets, and is re-validated on load.

mod block;
mod error;
mod field;
mod hash;
mod packet;
mod protocol;

pub use block::{Cardinality, MapBlock, MAX_VARIABLE_OCCURRENCES};
pub use error::{SchemaError, SchemaResult};
pub use field::{FieldType, LengthPrefix, MapField};
pub use hash::protocol_fingerprint;
pub use packet::MapPacket;
pub use protocol::{Protocol, ProtocolBuilder};
