//! Field-level encoding.
//!
//! Integers and floats are little-endian. `IpPort` is the one exception: it
//! travels in network byte order. UUIDs, IPv4 addresses and fixed arrays are
//! raw bytes. Vector and quaternion types are their `f32`/`f64` components in
//! X, Y, Z, W order.

use std::net::Ipv4Addr;

use bytestream::{ByteReader, ByteWriter};
use glam::{DVec3, Quat, Vec3, Vec4};
use schema::{FieldType, LengthPrefix, MapField};
use uuid::Uuid;

use crate::error::{CodecError, CodecResult, ValueReason};
use crate::value::FieldValue;

/// Checks that `value` can be encoded as `field`.
pub fn check_field(field: &MapField, value: &FieldValue) -> CodecResult<()> {
    if !value.is_type(field.ty) {
        return Err(CodecError::InvalidValue {
            field: field.name.clone(),
            reason: ValueReason::TypeMismatch {
                expected: field.ty.name(),
                found: value.type_name(),
            },
        });
    }
    match (field.ty, value) {
        (FieldType::Fixed { len }, FieldValue::Fixed(data)) if data.len() != len => {
            Err(CodecError::InvalidValue {
                field: field.name.clone(),
                reason: ValueReason::FixedLength {
                    expected: len,
                    actual: data.len(),
                },
            })
        }
        (FieldType::Variable { prefix }, FieldValue::Variable(data))
            if data.len() > prefix.max_len() =>
        {
            Err(CodecError::Overflow {
                field: field.name.clone(),
                len: data.len(),
                max: prefix.max_len(),
            })
        }
        _ => Ok(()),
    }
}

/// Encoded length of `value`, after checking it against `field`.
pub fn field_len(field: &MapField, value: &FieldValue) -> CodecResult<usize> {
    check_field(field, value)?;
    Ok(match (field.ty, value) {
        (FieldType::Variable { prefix }, FieldValue::Variable(data)) => prefix.width() + data.len(),
        (ty, _) => ty.wire_size().unwrap_or_default(),
    })
}

/// Encodes one field value.
///
/// The value is checked before anything is written, so an oversized
/// variable array leaves the writer untouched.
pub fn write_field(
    field: &MapField,
    value: &FieldValue,
    writer: &mut ByteWriter<'_>,
) -> CodecResult<()> {
    check_field(field, value)?;
    match value {
        FieldValue::Bool(v) => writer.write_u8(u8::from(*v))?,
        FieldValue::U8(v) => writer.write_u8(*v)?,
        FieldValue::I8(v) => writer.write_i8(*v)?,
        FieldValue::U16(v) => writer.write_u16_le(*v)?,
        FieldValue::I16(v) => writer.write_i16_le(*v)?,
        FieldValue::IpPort(v) => writer.write_u16_be(*v)?,
        FieldValue::U32(v) => writer.write_u32_le(*v)?,
        FieldValue::I32(v) => writer.write_i32_le(*v)?,
        FieldValue::IpAddr(v) => writer.write_bytes(&v.octets())?,
        FieldValue::F32(v) => writer.write_f32_le(*v)?,
        FieldValue::F64(v) => writer.write_f64_le(*v)?,
        FieldValue::U64(v) => writer.write_u64_le(*v)?,
        FieldValue::Uuid(v) => writer.write_bytes(v.as_bytes())?,
        FieldValue::Vector3(v) => write_f32s(writer, &v.to_array())?,
        FieldValue::Vector3d(v) => {
            for component in v.to_array() {
                writer.write_f64_le(component)?;
            }
        }
        FieldValue::Vector4(v) => write_f32s(writer, &v.to_array())?,
        FieldValue::Quaternion(v) => write_f32s(writer, &v.to_array())?,
        FieldValue::Fixed(data) => writer.write_bytes(data)?,
        FieldValue::Variable(data) => {
            if let FieldType::Variable { prefix } = field.ty {
                match prefix {
                    LengthPrefix::U8 => writer.write_u8(data.len() as u8)?,
                    LengthPrefix::U16 => writer.write_u16_le(data.len() as u16)?,
                }
            }
            writer.write_bytes(data)?;
        }
    }
    Ok(())
}

/// Decodes one field value.
///
/// Fails without reading past the end of `reader` when too few bytes remain.
pub fn read_field(field: &MapField, reader: &mut ByteReader<'_>) -> CodecResult<FieldValue> {
    let value = match field.ty {
        FieldType::Bool => FieldValue::Bool(reader.read_u8()? != 0),
        FieldType::U8 => FieldValue::U8(reader.read_u8()?),
        FieldType::I8 => FieldValue::I8(reader.read_i8()?),
        FieldType::U16 => FieldValue::U16(reader.read_u16_le()?),
        FieldType::I16 => FieldValue::I16(reader.read_i16_le()?),
        FieldType::IpPort => FieldValue::IpPort(reader.read_u16_be()?),
        FieldType::U32 => FieldValue::U32(reader.read_u32_le()?),
        FieldType::I32 => FieldValue::I32(reader.read_i32_le()?),
        FieldType::IpAddr => FieldValue::IpAddr(Ipv4Addr::from(reader.read_array::<4>()?)),
        FieldType::F32 => FieldValue::F32(reader.read_f32_le()?),
        FieldType::F64 => FieldValue::F64(reader.read_f64_le()?),
        FieldType::U64 => FieldValue::U64(reader.read_u64_le()?),
        FieldType::Uuid => FieldValue::Uuid(Uuid::from_bytes(reader.read_array::<16>()?)),
        FieldType::Vector3 => {
            let [x, y, z] = read_f32s::<3>(reader)?;
            FieldValue::Vector3(Vec3::new(x, y, z))
        }
        FieldType::Vector3d => {
            let x = reader.read_f64_le()?;
            let y = reader.read_f64_le()?;
            let z = reader.read_f64_le()?;
            FieldValue::Vector3d(DVec3::new(x, y, z))
        }
        FieldType::Vector4 => FieldValue::Vector4(Vec4::from_array(read_f32s::<4>(reader)?)),
        FieldType::Quaternion => {
            let [x, y, z, w] = read_f32s::<4>(reader)?;
            FieldValue::Quaternion(Quat::from_xyzw(x, y, z, w))
        }
        FieldType::Fixed { len } => FieldValue::Fixed(reader.read_bytes(len)?.to_vec()),
        FieldType::Variable { prefix } => {
            let len = match prefix {
                LengthPrefix::U8 => usize::from(reader.read_u8()?),
                LengthPrefix::U16 => usize::from(reader.read_u16_le()?),
            };
            FieldValue::Variable(reader.read_bytes(len)?.to_vec())
        }
    };
    Ok(value)
}

fn write_f32s(writer: &mut ByteWriter<'_>, components: &[f32]) -> CodecResult<()> {
    for &component in components {
        writer.write_f32_le(component)?;
    }
    Ok(())
}

fn read_f32s<const N: usize>(reader: &mut ByteReader<'_>) -> CodecResult<[f32; N]> {
    let mut components = [0.0; N];
    for component in &mut components {
        *component = reader.read_f32_le()?;
    }
    Ok(components)
}
