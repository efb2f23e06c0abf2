//! Translation between packet instances and structured data.
//!
//! A packet becomes a JSON object keyed by block name. Each block is an array
//! of occurrence objects keyed by field name, so names and types map 1:1 onto
//! the layout. UUIDs and IPv4 addresses are strings, vectors and quaternions
//! are arrays of numbers, byte arrays are arrays of integers.
//! Non-finite floats, which JSON cannot hold as numbers, are the strings
//! `"NaN"`, `"inf"` and `"-inf"`.

use std::net::Ipv4Addr;

use glam::{DVec3, Quat, Vec3, Vec4};
use schema::{Cardinality, FieldType, MapPacket};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::error::{CodecError, CodecResult};
use crate::value::{BlockData, BlockEntry, FieldValue, Packet};

/// Converts a packet instance to structured data.
pub fn to_structured(schema: &MapPacket, packet: &Packet) -> CodecResult<Value> {
    if packet.blocks.len() != schema.blocks.len() {
        return Err(CodecError::BlockCountMismatch {
            packet: schema.name.clone(),
            expected: schema.blocks.len(),
            actual: packet.blocks.len(),
        });
    }

    let mut object = Map::new();
    for (block, data) in schema.blocks.iter().zip(&packet.blocks) {
        let mut entries = Vec::with_capacity(data.entries.len());
        for entry in &data.entries {
            if entry.fields.len() != block.fields.len() {
                return Err(CodecError::FieldCountMismatch {
                    block: block.name.clone(),
                    expected: block.fields.len(),
                    actual: entry.fields.len(),
                });
            }
            let fields = block
                .fields
                .iter()
                .zip(&entry.fields)
                .map(|(field, value)| (field.name.clone(), field_to_value(value)))
                .collect::<Map<_, _>>();
            entries.push(Value::Object(fields));
        }
        object.insert(block.name.clone(), Value::Array(entries));
    }
    Ok(Value::Object(object))
}

/// Builds a packet instance from structured data.
///
/// A missing variable block is read as empty. Unknown keys are ignored.
/// Array lengths are checked when the packet is encoded, not here.
pub fn from_structured(schema: &MapPacket, value: &Value) -> CodecResult<Packet> {
    let object = value
        .as_object()
        .ok_or_else(|| structured_error(&schema.name, "expected an object"))?;

    let mut blocks = Vec::with_capacity(schema.blocks.len());
    for block in &schema.blocks {
        let items = match object.get(&block.name) {
            Some(Value::Array(items)) => items.as_slice(),
            Some(_) => return Err(structured_error(&block.name, "expected an array")),
            None if block.cardinality == Cardinality::Variable => &[] as &[Value],
            None => return Err(structured_error(&block.name, "missing block")),
        };

        let mut entries = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let path = format!("{}[{index}]", block.name);
            let item = item
                .as_object()
                .ok_or_else(|| structured_error(&path, "expected an object"))?;
            let fields = block
                .fields
                .iter()
                .map(|field| {
                    let path = format!("{path}.{}", field.name);
                    let value = item
                        .get(&field.name)
                        .ok_or_else(|| structured_error(&path, "missing field"))?;
                    field_from_value(field.ty, value).map_err(|reason| CodecError::Structured {
                        path,
                        reason,
                    })
                })
                .collect::<CodecResult<Vec<_>>>()?;
            entries.push(BlockEntry::new(fields));
        }
        blocks.push(BlockData::new(entries));
    }
    Ok(Packet::new(blocks))
}

fn structured_error(path: &str, reason: &str) -> CodecError {
    CodecError::Structured {
        path: path.to_owned(),
        reason: reason.to_owned(),
    }
}

fn field_to_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Bool(v) => Value::Bool(*v),
        FieldValue::U8(v) => json!(v),
        FieldValue::I8(v) => json!(v),
        FieldValue::U16(v) | FieldValue::IpPort(v) => json!(v),
        FieldValue::I16(v) => json!(v),
        FieldValue::U32(v) => json!(v),
        FieldValue::I32(v) => json!(v),
        FieldValue::IpAddr(v) => Value::String(v.to_string()),
        FieldValue::F32(v) => float(f64::from(*v)),
        FieldValue::F64(v) => float(*v),
        FieldValue::U64(v) => json!(v),
        FieldValue::Uuid(v) => Value::String(v.hyphenated().to_string()),
        FieldValue::Vector3(v) => floats(v.to_array().map(f64::from)),
        FieldValue::Vector3d(v) => floats(v.to_array()),
        FieldValue::Vector4(v) => floats(v.to_array().map(f64::from)),
        FieldValue::Quaternion(v) => floats(v.to_array().map(f64::from)),
        FieldValue::Fixed(data) | FieldValue::Variable(data) => json!(data),
    }
}

/// JSON has no non-finite numbers; they travel as `"NaN"`, `"inf"` and `"-inf"`.
fn float(v: f64) -> Value {
    if v.is_nan() {
        Value::String("NaN".to_owned())
    } else if v.is_infinite() {
        Value::String(if v > 0.0 { "inf" } else { "-inf" }.to_owned())
    } else {
        json!(v)
    }
}

fn floats<const N: usize>(components: [f64; N]) -> Value {
    Value::Array(components.into_iter().map(float).collect())
}

fn field_from_value(ty: FieldType, value: &Value) -> Result<FieldValue, String> {
    let field = match ty {
        FieldType::Bool => FieldValue::Bool(value.as_bool().ok_or("expected a boolean")?),
        FieldType::U8 => FieldValue::U8(unsigned(value)?),
        FieldType::I8 => FieldValue::I8(signed(value)?),
        FieldType::U16 => FieldValue::U16(unsigned(value)?),
        FieldType::I16 => FieldValue::I16(signed(value)?),
        FieldType::IpPort => FieldValue::IpPort(unsigned(value)?),
        FieldType::U32 => FieldValue::U32(unsigned(value)?),
        FieldType::I32 => FieldValue::I32(signed(value)?),
        FieldType::U64 => FieldValue::U64(unsigned(value)?),
        FieldType::F32 => FieldValue::F32(number(value)? as f32),
        FieldType::F64 => FieldValue::F64(number(value)?),
        FieldType::IpAddr => {
            let text = value.as_str().ok_or("expected an address string")?;
            FieldValue::IpAddr(
                text.parse::<Ipv4Addr>()
                    .map_err(|err| format!("invalid address {text:?}: {err}"))?,
            )
        }
        FieldType::Uuid => {
            let text = value.as_str().ok_or("expected a uuid string")?;
            FieldValue::Uuid(
                Uuid::parse_str(text).map_err(|err| format!("invalid uuid {text:?}: {err}"))?,
            )
        }
        FieldType::Vector3 => {
            let [x, y, z] = numbers::<3>(value)?;
            FieldValue::Vector3(Vec3::new(x as f32, y as f32, z as f32))
        }
        FieldType::Vector3d => FieldValue::Vector3d(DVec3::from_array(numbers::<3>(value)?)),
        FieldType::Vector4 => {
            FieldValue::Vector4(Vec4::from_array(numbers::<4>(value)?.map(|c| c as f32)))
        }
        FieldType::Quaternion => {
            let [x, y, z, w] = numbers::<4>(value)?.map(|c| c as f32);
            FieldValue::Quaternion(Quat::from_xyzw(x, y, z, w))
        }
        FieldType::Fixed { .. } => FieldValue::Fixed(bytes(value)?),
        FieldType::Variable { .. } => FieldValue::Variable(bytes(value)?),
    };
    Ok(field)
}

fn unsigned<T: TryFrom<u64>>(value: &Value) -> Result<T, String> {
    let raw = value.as_u64().ok_or("expected an unsigned integer")?;
    T::try_from(raw).map_err(|_| format!("{raw} is out of range"))
}

fn signed<T: TryFrom<i64>>(value: &Value) -> Result<T, String> {
    let raw = value.as_i64().ok_or("expected an integer")?;
    T::try_from(raw).map_err(|_| format!("{raw} is out of range"))
}

fn number(value: &Value) -> Result<f64, String> {
    match value {
        Value::String(text) => match text.as_str() {
            "NaN" => Ok(f64::NAN),
            "inf" => Ok(f64::INFINITY),
            "-inf" => Ok(f64::NEG_INFINITY),
            _ => Err(format!("expected a number, got {text:?}")),
        },
        _ => value.as_f64().ok_or_else(|| "expected a number".to_owned()),
    }
}

fn numbers<const N: usize>(value: &Value) -> Result<[f64; N], String> {
    let items = value.as_array().ok_or("expected an array of numbers")?;
    if items.len() != N {
        return Err(format!("expected {N} components, got {}", items.len()));
    }
    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = number(item)?;
    }
    Ok(out)
}

fn bytes(value: &Value) -> Result<Vec<u8>, String> {
    value
        .as_array()
        .ok_or("expected an array of bytes")?
        .iter()
        .map(unsigned::<u8>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::{LengthPrefix, MapBlock, MapField};
    use wire::Frequency;

    fn layout() -> MapPacket {
        MapPacket::new("EnableSimulator", Frequency::Low, 151)
            .block(
                MapBlock::single("SimulatorInfo")
                    .field(MapField::new("Handle", FieldType::U64))
                    .field(MapField::new("IP", FieldType::IpAddr))
                    .field(MapField::new("Port", FieldType::IpPort)),
            )
            .block(
                MapBlock::variable("Names")
                    .field(MapField::new("ID", FieldType::Uuid))
                    .field(MapField::variable("Name", LengthPrefix::U8))
                    .field(MapField::new("Pos", FieldType::Vector3)),
            )
    }

    fn instance() -> Packet {
        Packet::new(vec![
            BlockData::single(vec![
                FieldValue::U64(0x0003_E800_0003_E800),
                FieldValue::IpAddr(Ipv4Addr::new(10, 0, 0, 7)),
                FieldValue::IpPort(13005),
            ]),
            BlockData::new(vec![BlockEntry::new(vec![
                FieldValue::Uuid(Uuid::from_u128(0x1234)),
                FieldValue::Variable(b"Ann".to_vec()),
                FieldValue::Vector3(Vec3::new(128.0, 64.5, 22.25)),
            ])]),
        ])
    }

    #[test]
    fn to_structured_shape() {
        let value = to_structured(&layout(), &instance()).unwrap();
        assert_eq!(value["SimulatorInfo"][0]["IP"], "10.0.0.7");
        assert_eq!(value["SimulatorInfo"][0]["Port"], 13005);
        assert_eq!(
            value["Names"][0]["ID"],
            "00000000-0000-0000-0000-000000001234"
        );
        assert_eq!(value["Names"][0]["Name"], json!([65, 110, 110]));
        assert_eq!(value["Names"][0]["Pos"], json!([128.0, 64.5, 22.25]));
    }

    #[test]
    fn structured_round_trip() {
        let schema = layout();
        let value = to_structured(&schema, &instance()).unwrap();
        assert_eq!(from_structured(&schema, &value).unwrap(), instance());
    }

    #[test]
    fn missing_variable_block_is_empty() {
        let schema = layout();
        let value = json!({
            "SimulatorInfo": [{ "Handle": 1, "IP": "1.2.3.4", "Port": 80 }]
        });
        let packet = from_structured(&schema, &value).unwrap();
        assert!(packet.blocks[1].is_empty());
    }

    #[test]
    fn missing_single_block_rejected() {
        let err = from_structured(&layout(), &json!({})).unwrap_err();
        assert!(matches!(err, CodecError::Structured { ref path, .. } if path == "SimulatorInfo"));
    }

    #[test]
    fn bad_field_reports_path() {
        let value = json!({
            "SimulatorInfo": [{ "Handle": 1, "IP": "not-an-ip", "Port": 80 }]
        });
        let err = from_structured(&layout(), &value).unwrap_err();
        assert!(
            matches!(err, CodecError::Structured { ref path, .. } if path == "SimulatorInfo[0].IP")
        );
    }

    #[test]
    fn out_of_range_integer_rejected() {
        let value = json!({
            "SimulatorInfo": [{ "Handle": 1, "IP": "1.2.3.4", "Port": 70000 }]
        });
        assert!(from_structured(&layout(), &value).is_err());
    }

    #[test]
    fn non_finite_floats_survive_round_trip() {
        let schema = MapPacket::new("Floats", Frequency::Low, 900).block(
            MapBlock::variable("Samples")
                .field(MapField::new("Single", FieldType::F32))
                .field(MapField::new("Double", FieldType::F64))
                .field(MapField::new("Pos", FieldType::Vector3)),
        );
        let entries = [f64::NAN, f64::INFINITY, f64::NEG_INFINITY]
            .into_iter()
            .map(|v| {
                BlockEntry::new(vec![
                    FieldValue::F32(v as f32),
                    FieldValue::F64(v),
                    FieldValue::Vector3(Vec3::new(v as f32, 1.5, -(v as f32))),
                ])
            })
            .collect();
        let packet = Packet::new(vec![BlockData::new(entries)]);

        let value = to_structured(&schema, &packet).unwrap();
        assert_eq!(value["Samples"][0]["Single"], "NaN");
        assert_eq!(value["Samples"][1]["Double"], "inf");
        assert_eq!(value["Samples"][2]["Pos"], json!(["-inf", 1.5, "inf"]));

        // Reparse from text as the tools do.
        let text = serde_json::to_string(&value).unwrap();
        let back = from_structured(&schema, &serde_json::from_str(&text).unwrap()).unwrap();
        let fields = |index: usize| back.blocks[0].entries[index].fields.clone();

        match fields(0).as_slice() {
            [FieldValue::F32(a), FieldValue::F64(b), FieldValue::Vector3(pos)] => {
                assert!(a.is_nan() && b.is_nan() && pos.x.is_nan() && pos.z.is_nan());
                assert_eq!(pos.y, 1.5);
            }
            other => panic!("unexpected fields {other:?}"),
        }
        assert_eq!(back.blocks[0].entries[1..], packet.blocks[0].entries[1..]);
    }

    #[test]
    fn unknown_float_word_rejected() {
        let schema = MapPacket::new("Floats", Frequency::Low, 900)
            .block(MapBlock::single("Sample").field(MapField::new("Value", FieldType::F32)));
        let err = from_structured(&schema, &json!({ "Sample": [{ "Value": "nan" }] })).unwrap_err();
        assert!(matches!(err, CodecError::Structured { ref path, .. } if path == "Sample[0].Value"));
    }
}
