//! Packet header types and constants.

use bytestream::{ByteReader, ByteWriter};

use crate::error::{WireError, WireResult};
use crate::frequency::{read_message_number, write_message_number, Frequency};

/// Bytes before the message number: flags, sequence, extra-header length.
pub const PREFIX_SIZE: usize = 1 + 4 + 1;

/// Smallest possible header (high frequency).
pub const MIN_HEADER_SIZE: usize = PREFIX_SIZE + 1;

/// Largest possible header (low frequency).
pub const MAX_HEADER_SIZE: usize = PREFIX_SIZE + 4;

/// Header flags (first byte of every datagram).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PacketFlags(u8);

impl PacketFlags {
    /// Body bytes are zero-coded.
    pub const ZEROCODED: u8 = 0x80;

    /// Sender expects an acknowledgement.
    pub const RELIABLE: u8 = 0x40;

    /// Datagram is a retransmission.
    pub const RESENT: u8 = 0x20;

    /// Datagram carries an appended acknowledgement list.
    pub const ACK: u8 = 0x10;

    /// Creates new flags from a raw value.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Returns the raw flag bits.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Returns `true` if the body is zero-coded.
    #[must_use]
    pub const fn is_zero_coded(self) -> bool {
        self.0 & Self::ZEROCODED != 0
    }

    /// Returns `true` if the packet is reliable.
    #[must_use]
    pub const fn is_reliable(self) -> bool {
        self.0 & Self::RELIABLE != 0
    }

    /// Returns `true` if the packet is a retransmission.
    #[must_use]
    pub const fn is_resent(self) -> bool {
        self.0 & Self::RESENT != 0
    }

    /// Returns `true` if acknowledgements are appended to the datagram.
    #[must_use]
    pub const fn has_appended_acks(self) -> bool {
        self.0 & Self::ACK != 0
    }

    /// Returns a copy with `bit` set or cleared.
    #[must_use]
    pub const fn with(self, bit: u8, enabled: bool) -> Self {
        if enabled {
            Self(self.0 | bit)
        } else {
            Self(self.0 & !bit)
        }
    }
}

/// Framing prefix of every datagram.
///
/// Layout: flags (1), sequence (4, big-endian), extra-header length (1),
/// then the frequency-scoped message number (1, 2 or 4 bytes). The header is
/// built fresh for each outgoing packet by the layer that owns sequencing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Header flags.
    pub flags: PacketFlags,
    /// Sequence number assigned by the circuit layer.
    pub sequence: u32,
    /// ID namespace.
    pub frequency: Frequency,
    /// Packet ID within `frequency`.
    pub id: u16,
}

impl PacketHeader {
    /// Creates a header with no flags set.
    #[must_use]
    pub const fn new(frequency: Frequency, id: u16, sequence: u32) -> Self {
        Self {
            flags: PacketFlags::from_raw(0),
            sequence,
            frequency,
            id,
        }
    }

    /// Sets or clears the reliable flag.
    #[must_use]
    pub const fn reliable(mut self, reliable: bool) -> Self {
        self.flags = self.flags.with(PacketFlags::RELIABLE, reliable);
        self
    }

    /// Sets or clears the zero-coded flag.
    #[must_use]
    pub const fn zero_coded(mut self, zero_coded: bool) -> Self {
        self.flags = self.flags.with(PacketFlags::ZEROCODED, zero_coded);
        self
    }

    /// Number of bytes [`encode_header`] writes for this header.
    #[must_use]
    pub const fn encoded_len(&self) -> usize {
        PREFIX_SIZE + self.frequency.id_len()
    }
}

/// Encodes a packet header.
///
/// The extra-header length is always written as zero.
pub fn encode_header(header: &PacketHeader, writer: &mut ByteWriter<'_>) -> WireResult<usize> {
    if !header.frequency.is_valid_id(header.id) {
        return Err(WireError::InvalidPacketId {
            frequency: header.frequency,
            id: header.id,
        });
    }
    let needed = header.encoded_len();
    if writer.remaining() < needed {
        return Err(bytestream::ByteError::BufferOverflow {
            requested: needed,
            available: writer.remaining(),
        }
        .into());
    }
    writer.write_u8(header.flags.raw())?;
    writer.write_u32_be(header.sequence)?;
    writer.write_u8(0)?;
    write_message_number(header.frequency, header.id, writer)?;
    Ok(needed)
}

/// Decodes a packet header, returning it and the number of bytes consumed.
///
/// Extra-header bytes announced by the sender are skipped.
pub fn decode_header(buf: &[u8]) -> WireResult<(PacketHeader, usize)> {
    if buf.len() < MIN_HEADER_SIZE {
        return Err(WireError::DatagramTooSmall {
            actual: buf.len(),
            required: MIN_HEADER_SIZE,
        });
    }

    let mut reader = ByteReader::new(buf);
    let flags = PacketFlags::from_raw(reader.read_u8()?);
    let sequence = reader.read_u32_be()?;
    let extra_len = usize::from(reader.read_u8()?);
    if reader.remaining() < extra_len + 1 {
        return Err(WireError::DatagramTooSmall {
            actual: buf.len(),
            required: PREFIX_SIZE + extra_len + 1,
        });
    }
    reader.read_bytes(extra_len)?;

    let (frequency, id) = read_message_number(&mut reader).map_err(|err| match err {
        WireError::Bytes(_) => WireError::DatagramTooSmall {
            actual: buf.len(),
            required: PREFIX_SIZE + extra_len + Frequency::Low.id_len(),
        },
        other => other,
    })?;

    Ok((
        PacketHeader {
            flags,
            sequence,
            frequency,
            id,
        },
        reader.position(),
    ))
}
