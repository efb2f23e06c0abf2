//! Schema-driven packet encoding, fragmentation and decoding for the lludp codec.
//!
//! This is the main codec crate. It ties together `bytestream`, `wire` and
//! `schema` into one generic encoder and decoder that walk a packet layout
//! instead of per-message generated code.
//!
//! # Features
//!
//! - Field, block and packet encoding per the simulator wire rules
//! - Greedy MTU-bounded fragmentation of variable blocks
//! - Per-datagram decoding into (possibly partial) packet instances
//! - A process-wide protocol table behind a `OnceLock`
//! - Structured-data translation (`structured` feature, on by default)
//!
//! # Encoding and decoding are asymmetric
//!
//! [`encode_packet`] splits a whole instance into as many datagrams as the MTU
//! requires. [`decode_packet`] decodes one datagram at a time: each fragment
//! yields its own [`Packet`] whose variable blocks hold only that fragment's
//! occurrences. Joining them is up to the caller, who owns sequencing; see
//! [`Packet::extend_from_fragment`].
//!
//! # Example
//!
//! ```
//! use codec::{decode_packet, encode_packet, BlockData, FieldValue, Packet};
//! use schema::{FieldType, MapBlock, MapField, MapPacket, Protocol};
//! use wire::{split_datagram, Frequency, Limits};
//!
//! let ping = MapPacket::new("CompletePingCheck", Frequency::High, 2)
//!     .block(MapBlock::single("PingID").field(MapField::new("PingID", FieldType::U8)));
//! let protocol = Protocol::new(vec![ping.clone()]).unwrap();
//!
//! let packet = Packet::new(vec![BlockData::single(vec![FieldValue::U8(7)])]);
//! let buffers = encode_packet(&ping, &ping.header(1), &packet, &Limits::default()).unwrap();
//! assert_eq!(buffers.len(), 1);
//!
//! let datagram = split_datagram(&buffers[0]).unwrap();
//! let decoded = decode_packet(&protocol, &datagram.header, datagram.body).unwrap();
//! assert_eq!(decoded, packet);
//! ```

mod block;
mod decode;
mod encode;
mod error;
mod field;
mod registry;
#[cfg(feature = "structured")]
mod structured;
mod value;

pub use block::{block_len, entry_len, read_block, write_block, write_entry};
pub use decode::{decode_body, decode_datagram, decode_packet, resolve, DecodedPacket};
pub use encode::encode_packet;
pub use error::{
    CodecError, CodecResult, ExpectedOccurrences, UnfragmentableReason, ValueReason,
};
pub use field::{check_field, field_len, read_field, write_field};
pub use registry::{install_protocol, protocol};
#[cfg(feature = "structured")]
pub use structured::{from_structured, to_structured};
pub use value::{BlockData, BlockEntry, FieldValue, Packet};
pub use wire::Limits;
