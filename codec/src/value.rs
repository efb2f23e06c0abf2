//! Packet instances: the caller-owned data an encode consumes or a decode yields.

use std::net::Ipv4Addr;

use glam::{DVec3, Quat, Vec3, Vec4};
use schema::{Cardinality, FieldType, MapPacket};
use uuid::Uuid;

use crate::error::{CodecError, CodecResult};

/// One decoded or to-be-encoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    IpPort(u16),
    U32(u32),
    I32(i32),
    IpAddr(Ipv4Addr),
    F32(f32),
    F64(f64),
    U64(u64),
    Uuid(Uuid),
    Vector3(Vec3),
    Vector3d(DVec3),
    Vector4(Vec4),
    Quaternion(Quat),
    Fixed(Vec<u8>),
    Variable(Vec<u8>),
}

impl FieldValue {
    /// The zero value of a field type. Fixed arrays are zero-filled.
    #[must_use]
    pub fn default_for(ty: FieldType) -> Self {
        match ty {
            FieldType::Bool => Self::Bool(false),
            FieldType::U8 => Self::U8(0),
            FieldType::I8 => Self::I8(0),
            FieldType::U16 => Self::U16(0),
            FieldType::I16 => Self::I16(0),
            FieldType::IpPort => Self::IpPort(0),
            FieldType::U32 => Self::U32(0),
            FieldType::I32 => Self::I32(0),
            FieldType::IpAddr => Self::IpAddr(Ipv4Addr::UNSPECIFIED),
            FieldType::F32 => Self::F32(0.0),
            FieldType::F64 => Self::F64(0.0),
            FieldType::U64 => Self::U64(0),
            FieldType::Uuid => Self::Uuid(Uuid::nil()),
            FieldType::Vector3 => Self::Vector3(Vec3::ZERO),
            FieldType::Vector3d => Self::Vector3d(DVec3::ZERO),
            FieldType::Vector4 => Self::Vector4(Vec4::ZERO),
            FieldType::Quaternion => Self::Quaternion(Quat::IDENTITY),
            FieldType::Fixed { len } => Self::Fixed(vec![0; len]),
            FieldType::Variable { .. } => Self::Variable(Vec::new()),
        }
    }

    /// Short type name, matching [`FieldType::name`].
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::U8(_) => "u8",
            Self::I8(_) => "i8",
            Self::U16(_) => "u16",
            Self::I16(_) => "i16",
            Self::IpPort(_) => "ipport",
            Self::U32(_) => "u32",
            Self::I32(_) => "i32",
            Self::IpAddr(_) => "ipaddr",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::U64(_) => "u64",
            Self::Uuid(_) => "uuid",
            Self::Vector3(_) => "vector3",
            Self::Vector3d(_) => "vector3d",
            Self::Vector4(_) => "vector4",
            Self::Quaternion(_) => "quaternion",
            Self::Fixed(_) => "fixed",
            Self::Variable(_) => "variable",
        }
    }

    /// Returns `true` if this value has the variant `ty` calls for.
    ///
    /// Array lengths are not checked here.
    #[must_use]
    pub const fn is_type(&self, ty: FieldType) -> bool {
        matches!(
            (self, ty),
            (Self::Bool(_), FieldType::Bool)
                | (Self::U8(_), FieldType::U8)
                | (Self::I8(_), FieldType::I8)
                | (Self::U16(_), FieldType::U16)
                | (Self::I16(_), FieldType::I16)
                | (Self::IpPort(_), FieldType::IpPort)
                | (Self::U32(_), FieldType::U32)
                | (Self::I32(_), FieldType::I32)
                | (Self::IpAddr(_), FieldType::IpAddr)
                | (Self::F32(_), FieldType::F32)
                | (Self::F64(_), FieldType::F64)
                | (Self::U64(_), FieldType::U64)
                | (Self::Uuid(_), FieldType::Uuid)
                | (Self::Vector3(_), FieldType::Vector3)
                | (Self::Vector3d(_), FieldType::Vector3d)
                | (Self::Vector4(_), FieldType::Vector4)
                | (Self::Quaternion(_), FieldType::Quaternion)
                | (Self::Fixed(_), FieldType::Fixed { .. })
                | (Self::Variable(_), FieldType::Variable { .. })
        )
    }
}

/// One occurrence of a block: field values in schema order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockEntry {
    pub fields: Vec<FieldValue>,
}

impl BlockEntry {
    #[must_use]
    pub fn new(fields: Vec<FieldValue>) -> Self {
        Self { fields }
    }
}

impl From<Vec<FieldValue>> for BlockEntry {
    fn from(fields: Vec<FieldValue>) -> Self {
        Self { fields }
    }
}

/// All occurrences of one block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockData {
    pub entries: Vec<BlockEntry>,
}

impl BlockData {
    #[must_use]
    pub fn new(entries: Vec<BlockEntry>) -> Self {
        Self { entries }
    }

    /// A block with exactly one occurrence.
    #[must_use]
    pub fn single(fields: Vec<FieldValue>) -> Self {
        Self {
            entries: vec![BlockEntry::new(fields)],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A packet instance: one [`BlockData`] per schema block, in schema order.
///
/// A decoded instance describes one datagram only. When the sender split a
/// packet into fragments, each fragment decodes to its own instance whose
/// variable blocks hold that fragment's slice; use
/// [`Packet::extend_from_fragment`] to join them in arrival order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Packet {
    pub blocks: Vec<BlockData>,
}

impl Packet {
    #[must_use]
    pub fn new(blocks: Vec<BlockData>) -> Self {
        Self { blocks }
    }

    /// A zero-valued instance shaped like `schema`: single and fixed-multiple
    /// blocks hold default occurrences, variable blocks are empty.
    #[must_use]
    pub fn default_for(schema: &MapPacket) -> Self {
        let blocks = schema
            .blocks
            .iter()
            .map(|block| {
                let occurrences = match block.cardinality {
                    Cardinality::Single => 1,
                    Cardinality::Multiple(count) => count,
                    Cardinality::Variable => 0,
                };
                let entry = BlockEntry::new(
                    block
                        .fields
                        .iter()
                        .map(|field| FieldValue::default_for(field.ty))
                        .collect(),
                );
                BlockData::new(vec![entry; occurrences])
            })
            .collect();
        Self { blocks }
    }

    /// Data of the block named `name`.
    #[must_use]
    pub fn block<'a>(&'a self, schema: &MapPacket, name: &str) -> Option<&'a BlockData> {
        self.blocks.get(schema.block_index(name)?)
    }

    /// Mutable data of the block named `name`.
    pub fn block_mut<'a>(&'a mut self, schema: &MapPacket, name: &str) -> Option<&'a mut BlockData> {
        self.blocks.get_mut(schema.block_index(name)?)
    }

    /// Appends the variable-block occurrences of a later fragment.
    ///
    /// Single and fixed-multiple blocks are repeated in every fragment and
    /// are kept from `self`.
    pub fn extend_from_fragment(&mut self, schema: &MapPacket, fragment: Self) -> CodecResult<()> {
        for actual in [self.blocks.len(), fragment.blocks.len()] {
            if actual != schema.blocks.len() {
                return Err(CodecError::BlockCountMismatch {
                    packet: schema.name.clone(),
                    expected: schema.blocks.len(),
                    actual,
                });
            }
        }
        for ((block, data), more) in schema
            .blocks
            .iter()
            .zip(&mut self.blocks)
            .zip(fragment.blocks)
        {
            if block.is_variable() {
                data.entries.extend(more.entries);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::{MapBlock, MapField};
    use wire::Frequency;

    fn layout() -> MapPacket {
        MapPacket::new("RequestMultipleObjects", Frequency::Medium, 3)
            .block(MapBlock::single("AgentData").field(MapField::new("AgentID", FieldType::Uuid)))
            .block(MapBlock::multiple("Pair", 2).field(MapField::new("Value", FieldType::U8)))
            .block(
                MapBlock::variable("ObjectData").field(MapField::new("ID", FieldType::U32)),
            )
    }

    #[test]
    fn default_instance_shape() {
        let packet = Packet::default_for(&layout());
        assert_eq!(packet.blocks.len(), 3);
        assert_eq!(packet.blocks[0].len(), 1);
        assert_eq!(packet.blocks[1].len(), 2);
        assert!(packet.blocks[2].is_empty());
        assert_eq!(
            packet.blocks[0].entries[0].fields[0],
            FieldValue::Uuid(Uuid::nil())
        );
    }

    #[test]
    fn default_values_match_types() {
        for ty in [
            FieldType::Bool,
            FieldType::IpPort,
            FieldType::IpAddr,
            FieldType::Quaternion,
            FieldType::Fixed { len: 3 },
        ] {
            let value = FieldValue::default_for(ty);
            assert!(value.is_type(ty));
            assert_eq!(value.type_name(), ty.name());
        }
        assert_eq!(
            FieldValue::default_for(FieldType::Fixed { len: 3 }),
            FieldValue::Fixed(vec![0; 3])
        );
    }

    #[test]
    fn u16_and_ipport_are_distinct_types() {
        assert!(!FieldValue::U16(80).is_type(FieldType::IpPort));
        assert!(!FieldValue::IpPort(80).is_type(FieldType::U16));
    }

    #[test]
    fn block_lookup_by_name() {
        let schema = layout();
        let mut packet = Packet::default_for(&schema);
        packet
            .block_mut(&schema, "ObjectData")
            .unwrap()
            .entries
            .push(BlockEntry::new(vec![FieldValue::U32(7)]));
        assert_eq!(packet.block(&schema, "ObjectData").unwrap().len(), 1);
        assert!(packet.block(&schema, "Missing").is_none());
    }

    #[test]
    fn extend_from_fragment_appends_variable_entries() {
        let schema = layout();
        let entry = |id| BlockEntry::new(vec![FieldValue::U32(id)]);

        let mut first = Packet::default_for(&schema);
        first.blocks[2].entries = vec![entry(1), entry(2)];
        let mut second = Packet::default_for(&schema);
        second.blocks[2].entries = vec![entry(3)];

        first.extend_from_fragment(&schema, second).unwrap();
        assert_eq!(first.blocks[2].entries, vec![entry(1), entry(2), entry(3)]);
        assert_eq!(first.blocks[1].len(), 2);
    }

    #[test]
    fn extend_from_fragment_rejects_wrong_shape() {
        let schema = layout();
        let mut packet = Packet::default_for(&schema);
        let err = packet
            .extend_from_fragment(&schema, Packet::default())
            .unwrap_err();
        assert!(matches!(err, CodecError::BlockCountMismatch { actual: 0, .. }));
    }
}
