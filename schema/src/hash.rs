//! Deterministic protocol fingerprinting.

use blake3::Hasher;
use wire::Frequency;

use crate::block::Cardinality;
use crate::field::{FieldType, LengthPrefix};
use crate::packet::MapPacket;

/// Computes a deterministic hash of a packet table's wire layout.
///
/// Names, identities, flags and the order of blocks and fields all
/// contribute; two peers with equal fingerprints agree on every layout.
#[must_use]
pub fn protocol_fingerprint(packets: &[MapPacket]) -> u64 {
    let mut hasher = Hasher::new();
    write_len(&mut hasher, packets.len());

    for packet in packets {
        write_str(&mut hasher, &packet.name);
        write_frequency(&mut hasher, packet.frequency);
        write_u16(&mut hasher, packet.id);
        write_u8(
            &mut hasher,
            u8::from(packet.reliable) | (u8::from(packet.zero_coded) << 1),
        );
        write_len(&mut hasher, packet.blocks.len());

        for block in &packet.blocks {
            write_str(&mut hasher, &block.name);
            write_cardinality(&mut hasher, block.cardinality);
            write_len(&mut hasher, block.fields.len());

            for field in &block.fields {
                write_str(&mut hasher, &field.name);
                write_field_type(&mut hasher, field.ty);
            }
        }
    }

    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

fn write_frequency(hasher: &mut Hasher, frequency: Frequency) {
    let tag = match frequency {
        Frequency::High => 0,
        Frequency::Medium => 1,
        Frequency::Low => 2,
    };
    write_u8(hasher, tag);
}

fn write_cardinality(hasher: &mut Hasher, cardinality: Cardinality) {
    match cardinality {
        Cardinality::Single => write_u8(hasher, 0),
        Cardinality::Multiple(count) => {
            write_u8(hasher, 1);
            write_len(hasher, count);
        }
        Cardinality::Variable => write_u8(hasher, 2),
    }
}

fn write_field_type(hasher: &mut Hasher, ty: FieldType) {
    let tag = match ty {
        FieldType::Bool => 0,
        FieldType::U8 => 1,
        FieldType::I8 => 2,
        FieldType::U16 => 3,
        FieldType::I16 => 4,
        FieldType::IpPort => 5,
        FieldType::U32 => 6,
        FieldType::I32 => 7,
        FieldType::IpAddr => 8,
        FieldType::F32 => 9,
        FieldType::F64 => 10,
        FieldType::U64 => 11,
        FieldType::Uuid => 12,
        FieldType::Vector3 => 13,
        FieldType::Vector3d => 14,
        FieldType::Vector4 => 15,
        FieldType::Quaternion => 16,
        FieldType::Fixed { len } => {
            write_u8(hasher, 17);
            write_len(hasher, len);
            return;
        }
        FieldType::Variable { prefix } => {
            write_u8(hasher, 18);
            write_u8(
                hasher,
                match prefix {
                    LengthPrefix::U8 => 1,
                    LengthPrefix::U16 => 2,
                },
            );
            return;
        }
    };
    write_u8(hasher, tag);
}

fn write_str(hasher: &mut Hasher, value: &str) {
    write_len(hasher, value.len());
    hasher.update(value.as_bytes());
}

fn write_u8(hasher: &mut Hasher, value: u8) {
    hasher.update(&[value]);
}

fn write_u16(hasher: &mut Hasher, value: u16) {
    hasher.update(&value.to_le_bytes());
}

fn write_len(hasher: &mut Hasher, value: usize) {
    hasher.update(&(value as u64).to_le_bytes());
}
