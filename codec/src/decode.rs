//! Packet decoding.

use bytestream::{ByteError, ByteReader};
use schema::{MapPacket, Protocol};
use tracing::{debug, trace};
use wire::{split_datagram, Datagram, PacketHeader};

use crate::block::read_block;
use crate::error::{CodecError, CodecResult};
use crate::value::Packet;

/// A datagram decoded against a protocol table.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPacket<'p> {
    pub header: PacketHeader,
    /// Layout the body was decoded with.
    pub schema: &'p MapPacket,
    pub packet: Packet,
    /// Sequence numbers acknowledged in the datagram trailer.
    pub appended_acks: Vec<u32>,
}

/// Resolves a header's wire identity against `protocol`.
pub fn resolve<'p>(protocol: &'p Protocol, header: &PacketHeader) -> CodecResult<&'p MapPacket> {
    protocol.lookup(header.frequency, header.id).ok_or_else(|| {
        debug!(
            frequency = %header.frequency,
            id = header.id,
            sequence = header.sequence,
            "unknown packet type"
        );
        CodecError::UnknownPacketType {
            frequency: header.frequency,
            id: header.id,
        }
    })
}

/// Decodes a packet body (header already removed) with a known layout.
///
/// The result holds only what this datagram carries: if the sender
/// fragmented the packet, variable blocks contain this fragment's slice.
/// Bytes left after the last block are ignored.
pub fn decode_body(schema: &MapPacket, body: &[u8]) -> CodecResult<Packet> {
    let mut reader = ByteReader::new(body);
    let mut blocks = Vec::with_capacity(schema.blocks.len());
    for block in &schema.blocks {
        let data = read_block(block, &mut reader).map_err(|err| match err {
            CodecError::Bytes(ByteError::UnexpectedEof {
                requested,
                available,
            }) => CodecError::TruncatedPacket {
                packet: schema.name.clone(),
                block: block.name.clone(),
                needed: requested,
                available,
            },
            other => other,
        })?;
        blocks.push(data);
    }
    if !reader.is_empty() {
        trace!(
            packet = %schema.name,
            trailing = reader.remaining(),
            "ignoring trailing body bytes"
        );
    }
    Ok(Packet::new(blocks))
}

/// Decodes a packet body whose header has already been parsed.
pub fn decode_packet(
    protocol: &Protocol,
    header: &PacketHeader,
    body: &[u8],
) -> CodecResult<Packet> {
    decode_body(resolve(protocol, header)?, body)
}

/// Splits and decodes a whole received datagram.
///
/// Zero-coded datagrams must be expanded before they reach this function.
pub fn decode_datagram<'p>(protocol: &'p Protocol, datagram: &[u8]) -> CodecResult<DecodedPacket<'p>> {
    let Datagram {
        header,
        body,
        appended_acks,
    } = split_datagram(datagram)?;
    let schema = resolve(protocol, &header)?;
    let packet = decode_body(schema, body)?;
    Ok(DecodedPacket {
        header,
        schema,
        packet,
        appended_acks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;
    use schema::{FieldType, MapBlock, MapField};
    use wire::Frequency;

    fn protocol() -> Protocol {
        Protocol::builder()
            .packet(
                MapPacket::new("StartPingCheck", Frequency::High, 1).block(
                    MapBlock::single("PingID")
                        .field(MapField::new("PingID", FieldType::U8))
                        .field(MapField::new("OldestUnacked", FieldType::U32)),
                ),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn decodes_known_packet() {
        let protocol = protocol();
        let header = PacketHeader::new(Frequency::High, 1, 0);
        let packet = decode_packet(&protocol, &header, &[4, 1, 0, 0, 0]).unwrap();
        assert_eq!(
            packet.blocks[0].entries[0].fields,
            vec![FieldValue::U8(4), FieldValue::U32(1)]
        );
    }

    #[test]
    fn unknown_packet_type() {
        let protocol = protocol();
        let header = PacketHeader::new(Frequency::Low, 1, 0);
        assert_eq!(
            decode_packet(&protocol, &header, &[]).unwrap_err(),
            CodecError::UnknownPacketType {
                frequency: Frequency::Low,
                id: 1,
            }
        );
    }

    #[test]
    fn truncated_body() {
        let protocol = protocol();
        let header = PacketHeader::new(Frequency::High, 1, 0);
        assert_eq!(
            decode_packet(&protocol, &header, &[4, 1, 0]).unwrap_err(),
            CodecError::TruncatedPacket {
                packet: "StartPingCheck".into(),
                block: "PingID".into(),
                needed: 4,
                available: 2,
            }
        );
    }

    #[test]
    fn trailing_bytes_ignored() {
        let protocol = protocol();
        let header = PacketHeader::new(Frequency::High, 1, 0);
        let packet = decode_packet(&protocol, &header, &[4, 1, 0, 0, 0, 0xEE]).unwrap();
        assert_eq!(packet.blocks.len(), 1);
    }

    #[test]
    fn decode_datagram_peels_acks() {
        let protocol = protocol();
        let mut datagram = vec![0x10, 0, 0, 0, 9, 0, 1, 4, 1, 0, 0, 0];
        datagram.extend_from_slice(&77u32.to_be_bytes());
        datagram.push(1);
        let decoded = decode_datagram(&protocol, &datagram).unwrap();
        assert_eq!(decoded.header.sequence, 9);
        assert_eq!(decoded.schema.name, "StartPingCheck");
        assert_eq!(decoded.appended_acks, vec![77]);
        assert_eq!(
            decoded.packet.blocks[0].entries[0].fields[1],
            FieldValue::U32(1)
        );
    }

    #[test]
    fn decode_datagram_rejects_short_header() {
        let protocol = protocol();
        assert!(matches!(
            decode_datagram(&protocol, &[0, 0, 0]),
            Err(CodecError::Wire(_))
        ));
    }
}
