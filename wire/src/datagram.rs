//! Splitting received datagrams into header, body and trailer.

use bytestream::ByteReader;

use crate::error::{WireError, WireResult};
use crate::header::{decode_header, PacketHeader, PREFIX_SIZE};

/// A received datagram split into its parts.
///
/// `body` holds the message bytes only: the header and any appended
/// acknowledgements have been removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram<'a> {
    pub header: PacketHeader,
    pub body: &'a [u8],
    /// Sequence numbers acknowledged in the trailer, in wire order.
    pub appended_acks: Vec<u32>,
}

/// Splits an expanded (not zero-coded) datagram into header and body.
///
/// When the `ACK` flag is set the trailer is peeled off: its last byte is the
/// number of acknowledgements, preceded by that many big-endian `u32`s.
pub fn split_datagram(buf: &[u8]) -> WireResult<Datagram<'_>> {
    let (header, header_len) = decode_header(buf)?;
    let mut end = buf.len();
    let mut appended_acks = Vec::new();

    if header.flags.has_appended_acks() {
        let available = end - header_len;
        let count = match buf.last() {
            Some(&count) if available > 0 => usize::from(count),
            _ => {
                return Err(WireError::AppendedAcksTruncated {
                    count: 0,
                    needed: 1,
                    available,
                })
            }
        };
        let needed = 1 + count * 4;
        if needed > available {
            return Err(WireError::AppendedAcksTruncated {
                count,
                needed,
                available,
            });
        }
        end -= needed;
        let mut reader = ByteReader::new(&buf[end..buf.len() - 1]);
        appended_acks.reserve(count);
        for _ in 0..count {
            appended_acks.push(reader.read_u32_be()?);
        }
    }

    Ok(Datagram {
        header,
        body: &buf[header_len..end],
        appended_acks,
    })
}

/// Rewrites the sequence number of an encoded datagram in place.
///
/// Fragments of one logical packet share its header; the transport stamps
/// each with its own sequence number before sending.
pub fn stamp_sequence(datagram: &mut [u8], sequence: u32) -> WireResult<()> {
    if datagram.len() < PREFIX_SIZE {
        return Err(WireError::DatagramTooSmall {
            actual: datagram.len(),
            required: PREFIX_SIZE,
        });
    }
    datagram[1..5].copy_from_slice(&sequence.to_be_bytes());
    Ok(())
}
