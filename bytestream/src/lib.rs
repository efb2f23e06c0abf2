//! Bounded byte cursors for the lludp codec.
//!
//! This crate provides [`ByteWriter`] and [`ByteReader`] for byte-level encoding and decoding.
//! It is designed for bounded, panic-free operation with explicit error handling.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads/writes are checked against the remaining capacity.
//! - **No domain knowledge** - This crate knows nothing about packets, blocks, or fields.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! Multi-byte values are little-endian unless the method name says otherwise
//! (`read_u16_be`/`write_u16_be` exist for network-order ports and framing).
//!
//! # Example
//!
//! ```
//! use bytestream::{ByteReader, ByteWriter};
//!
//! let mut buf = [0u8; 8];
//! let mut writer = ByteWriter::new(&mut buf);
//! writer.write_u8(7).unwrap();
//! writer.write_u32_le(0xDEAD_BEEF).unwrap();
//! let used = writer.finish();
//!
//! let mut reader = ByteReader::new(&buf[..used]);
//! assert_eq!(reader.read_u8().unwrap(), 7);
//! assert_eq!(reader.read_u32_le().unwrap(), 0xDEAD_BEEF);
//! assert!(reader.is_empty());
//! ```

mod error;
mod reader;
mod writer;

pub use error::{ByteError, ByteResult};
pub use reader::ByteReader;
pub use writer::ByteWriter;
