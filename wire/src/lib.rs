//! Datagram framing and header layout for the lludp codec.
//!
//! This crate handles the binary framing of simulator datagrams: header flags,
//! sequence numbers, frequency-scoped message numbers and the MTU limit. It
//! does not know about packet schemas, only the structure around them.
//!
//! # Design Principles
//!
//! - **Stable wire format** - Header layout matches the simulator protocol byte for byte.
//! - **Bounded decoding** - Every length is validated before it is used.
//! - **No domain knowledge** - This crate frames packets; blocks and fields live elsewhere.
//!
//! Zero-coding is signalled by [`PacketFlags::ZEROCODED`] but applied outside
//! this crate: [`split_datagram`] expects already-expanded bytes.

mod datagram;
mod error;
mod frequency;
mod header;
mod limits;

pub use datagram::{split_datagram, stamp_sequence, Datagram};
pub use error::{MessageNumberReason, WireError, WireResult};
pub use frequency::{read_message_number, write_message_number, Frequency, FREQUENCY_ESCAPE};
pub use header::{
    decode_header, encode_header, PacketFlags, PacketHeader, MAX_HEADER_SIZE, MIN_HEADER_SIZE,
    PREFIX_SIZE,
};
pub use limits::{Limits, MTU};

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn public_api_exports() {
        // Verify all expected items are exported
        let _ = MTU;
        let _ = MIN_HEADER_SIZE;
        let _ = MAX_HEADER_SIZE;
        let _ = PacketFlags::default();
        let _ = PacketHeader::new(Frequency::High, 1, 0);
        let _ = Limits::default();

        // Error types
        let _: WireResult<()> = Ok(());
    }

    #[test]
    fn prefix_size_constant_correct() {
        assert_eq!(
            PREFIX_SIZE,
            size_of::<u8>() // flags
                + size_of::<u32>() // sequence
                + size_of::<u8>() // extra header length
        );
    }

    #[test]
    fn header_fits_in_mtu() {
        assert!(MAX_HEADER_SIZE < Limits::default().mtu);
    }
}
