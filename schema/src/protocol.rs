//! The validated, immutable protocol table.

use std::collections::{HashMap, HashSet};

use wire::Frequency;

use crate::block::Cardinality;
use crate::error::{SchemaError, SchemaResult};
use crate::field::FieldType;
use crate::hash::protocol_fingerprint;
use crate::packet::MapPacket;

/// A validated set of packet layouts, indexed by wire identity and name.
///
/// Built once and shared read-only by every encode and decode call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<MapPacket>", into = "Vec<MapPacket>")
)]
pub struct Protocol {
    packets: Vec<MapPacket>,
    by_id: HashMap<(Frequency, u16), usize>,
    by_name: HashMap<String, usize>,
}

impl Protocol {
    /// Creates a protocol table after validation.
    pub fn new(packets: Vec<MapPacket>) -> SchemaResult<Self> {
        let mut by_id = HashMap::with_capacity(packets.len());
        let mut by_name = HashMap::with_capacity(packets.len());

        for (index, packet) in packets.iter().enumerate() {
            validate_packet(packet)?;

            if let Some(&other) = by_id.get(&(packet.frequency, packet.id)) {
                let other: &MapPacket = &packets[other];
                return Err(SchemaError::DuplicatePacketId {
                    frequency: packet.frequency,
                    id: packet.id,
                    first: other.name.clone(),
                    second: packet.name.clone(),
                });
            }
            if by_name.contains_key(&packet.name) {
                return Err(SchemaError::DuplicatePacketName {
                    name: packet.name.clone(),
                });
            }
            by_id.insert((packet.frequency, packet.id), index);
            by_name.insert(packet.name.clone(), index);
        }

        Ok(Self {
            packets,
            by_id,
            by_name,
        })
    }

    /// Creates a protocol builder.
    #[must_use]
    pub fn builder() -> ProtocolBuilder {
        ProtocolBuilder::default()
    }

    /// Resolves a wire identity to its packet layout.
    #[must_use]
    pub fn lookup(&self, frequency: Frequency, id: u16) -> Option<&MapPacket> {
        self.by_id
            .get(&(frequency, id))
            .map(|&index| &self.packets[index])
    }

    /// Resolves a packet name to its layout.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&MapPacket> {
        self.by_name.get(name).map(|&index| &self.packets[index])
    }

    /// All packets, in definition order.
    #[must_use]
    pub fn packets(&self) -> &[MapPacket] {
        &self.packets
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Deterministic hash of the layout, for detecting protocol skew.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        protocol_fingerprint(&self.packets)
    }
}

impl TryFrom<Vec<MapPacket>> for Protocol {
    type Error = SchemaError;

    fn try_from(packets: Vec<MapPacket>) -> SchemaResult<Self> {
        Self::new(packets)
    }
}

impl From<Protocol> for Vec<MapPacket> {
    fn from(protocol: Protocol) -> Self {
        protocol.packets
    }
}

/// Builder for [`Protocol`].
#[derive(Debug, Default)]
pub struct ProtocolBuilder {
    packets: Vec<MapPacket>,
}

impl ProtocolBuilder {
    /// Adds a packet definition.
    #[must_use]
    pub fn packet(mut self, packet: MapPacket) -> Self {
        self.packets.push(packet);
        self
    }

    /// Builds the protocol after validation.
    pub fn build(self) -> SchemaResult<Protocol> {
        Protocol::new(self.packets)
    }
}

fn validate_packet(packet: &MapPacket) -> SchemaResult<()> {
    if !packet.frequency.is_valid_id(packet.id) {
        return Err(SchemaError::InvalidPacketId {
            packet: packet.name.clone(),
            frequency: packet.frequency,
            id: packet.id,
        });
    }

    let mut block_names = HashSet::new();
    for block in &packet.blocks {
        if !block_names.insert(block.name.as_str()) {
            return Err(SchemaError::DuplicateBlockName {
                packet: packet.name.clone(),
                block: block.name.clone(),
            });
        }
        if let Cardinality::Multiple(count) = block.cardinality {
            if count < 2 {
                return Err(SchemaError::InvalidMultipleCount {
                    packet: packet.name.clone(),
                    block: block.name.clone(),
                    count,
                });
            }
        }
        if block.fields.is_empty() {
            return Err(SchemaError::EmptyBlock {
                packet: packet.name.clone(),
                block: block.name.clone(),
            });
        }

        let mut field_names = HashSet::new();
        for field in &block.fields {
            if !field_names.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateFieldName {
                    packet: packet.name.clone(),
                    block: block.name.clone(),
                    field: field.name.clone(),
                });
            }
            if field.ty == (FieldType::Fixed { len: 0 }) {
                return Err(SchemaError::ZeroLengthFixed {
                    packet: packet.name.clone(),
                    block: block.name.clone(),
                    field: field.name.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::MapBlock;
    use crate::field::MapField;

    fn packet(name: &str, frequency: Frequency, id: u16) -> MapPacket {
        MapPacket::new(name, frequency, id)
            .block(MapBlock::single("Data").field(MapField::new("Value", FieldType::U32)))
    }

    #[test]
    fn lookup_by_frequency_and_id() {
        let protocol = Protocol::builder()
            .packet(packet("StartPingCheck", Frequency::High, 1))
            .packet(packet("TestMessage", Frequency::Low, 1))
            .packet(packet("ObjectAdd", Frequency::Medium, 1))
            .build()
            .unwrap();

        assert_eq!(protocol.len(), 3);
        assert_eq!(
            protocol.lookup(Frequency::High, 1).unwrap().name,
            "StartPingCheck"
        );
        assert_eq!(protocol.lookup(Frequency::Low, 1).unwrap().name, "TestMessage");
        assert_eq!(protocol.lookup(Frequency::Medium, 1).unwrap().name, "ObjectAdd");
        assert!(protocol.lookup(Frequency::High, 2).is_none());
        assert_eq!(protocol.by_name("ObjectAdd").unwrap().id, 1);
        assert!(protocol.by_name("Missing").is_none());
    }

    #[test]
    fn rejects_duplicate_wire_identity() {
        let err = Protocol::new(vec![
            packet("A", Frequency::Low, 5),
            packet("B", Frequency::Low, 5),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicatePacketId {
                frequency: Frequency::Low,
                id: 5,
                first: "A".into(),
                second: "B".into(),
            }
        );
    }

    #[test]
    fn rejects_duplicate_name() {
        let err = Protocol::new(vec![
            packet("A", Frequency::Low, 5),
            packet("A", Frequency::Low, 6),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicatePacketName { .. }));
    }

    #[test]
    fn rejects_out_of_range_ids() {
        for (frequency, id) in [
            (Frequency::High, 0),
            (Frequency::High, 255),
            (Frequency::Medium, 255),
            (Frequency::Low, 0),
        ] {
            let err = Protocol::new(vec![packet("A", frequency, id)]).unwrap_err();
            assert!(
                matches!(err, SchemaError::InvalidPacketId { .. }),
                "{frequency} {id}"
            );
        }
    }

    #[test]
    fn rejects_bad_blocks() {
        let dup_block = packet("A", Frequency::Low, 1)
            .block(MapBlock::single("Data").field(MapField::new("X", FieldType::U8)));
        assert!(matches!(
            Protocol::new(vec![dup_block]).unwrap_err(),
            SchemaError::DuplicateBlockName { .. }
        ));

        let one_multiple = MapPacket::new("A", Frequency::Low, 1)
            .block(MapBlock::multiple("Data", 1).field(MapField::new("X", FieldType::U8)));
        assert!(matches!(
            Protocol::new(vec![one_multiple]).unwrap_err(),
            SchemaError::InvalidMultipleCount { count: 1, .. }
        ));

        let empty = MapPacket::new("A", Frequency::Low, 1).block(MapBlock::variable("Data"));
        assert!(matches!(
            Protocol::new(vec![empty]).unwrap_err(),
            SchemaError::EmptyBlock { .. }
        ));
    }

    #[test]
    fn rejects_bad_fields() {
        let dup_field = MapPacket::new("A", Frequency::Low, 1).block(
            MapBlock::single("Data")
                .field(MapField::new("X", FieldType::U8))
                .field(MapField::new("X", FieldType::U16)),
        );
        assert!(matches!(
            Protocol::new(vec![dup_field]).unwrap_err(),
            SchemaError::DuplicateFieldName { .. }
        ));

        let zero_fixed = MapPacket::new("A", Frequency::Low, 1)
            .block(MapBlock::single("Data").field(MapField::fixed("X", 0)));
        assert!(matches!(
            Protocol::new(vec![zero_fixed]).unwrap_err(),
            SchemaError::ZeroLengthFixed { .. }
        ));
    }

    #[test]
    fn empty_protocol_is_valid() {
        let protocol = Protocol::new(Vec::new()).unwrap();
        assert!(protocol.is_empty());
    }
}
