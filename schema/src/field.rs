//! Field types and field definitions.

/// Width of the runtime length prefix of a variable-length field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LengthPrefix {
    /// One-byte prefix, at most 255 bytes of data.
    U8,
    /// Two-byte little-endian prefix, at most 1024 bytes of data.
    U16,
}

impl LengthPrefix {
    /// Prefix width in bytes.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
        }
    }

    /// Largest data length the prefix may announce.
    #[must_use]
    pub const fn max_len(self) -> usize {
        match self {
            Self::U8 => 255,
            Self::U16 => 1024,
        }
    }
}

/// The wire type of a field.
///
/// Every type has a fixed width except [`FieldType::Variable`], whose
/// encoded length depends on the data it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldType {
    Bool,
    U8,
    I8,
    U16,
    I16,
    /// Port number, big-endian on the wire.
    IpPort,
    U32,
    I32,
    /// IPv4 address, raw octets.
    IpAddr,
    F32,
    F64,
    U64,
    /// 16 raw bytes.
    Uuid,
    Vector3,
    Vector3d,
    Vector4,
    Quaternion,
    /// Raw byte array of exactly `len` bytes.
    Fixed { len: usize },
    /// Length-prefixed byte array.
    Variable { prefix: LengthPrefix },
}

impl FieldType {
    /// Encoded width in bytes, or `None` if it depends on the value.
    #[must_use]
    pub const fn wire_size(self) -> Option<usize> {
        let size = match self {
            Self::Bool | Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 | Self::IpPort => 2,
            Self::U32 | Self::I32 | Self::IpAddr | Self::F32 => 4,
            Self::F64 | Self::U64 => 8,
            Self::Vector3 => 12,
            Self::Uuid | Self::Vector4 | Self::Quaternion => 16,
            Self::Vector3d => 24,
            Self::Fixed { len } => len,
            Self::Variable { .. } => return None,
        };
        Some(size)
    }

    /// Short type name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::IpPort => "ipport",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::IpAddr => "ipaddr",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::U64 => "u64",
            Self::Uuid => "uuid",
            Self::Vector3 => "vector3",
            Self::Vector3d => "vector3d",
            Self::Vector4 => "vector4",
            Self::Quaternion => "quaternion",
            Self::Fixed { .. } => "fixed",
            Self::Variable { .. } => "variable",
        }
    }
}

/// A named field within a block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapField {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub ty: FieldType,
}

impl MapField {
    /// Creates a field definition.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Creates a fixed-length byte array field.
    #[must_use]
    pub fn fixed(name: impl Into<String>, len: usize) -> Self {
        Self::new(name, FieldType::Fixed { len })
    }

    /// Creates a variable-length byte array field.
    #[must_use]
    pub fn variable(name: impl Into<String>, prefix: LengthPrefix) -> Self {
        Self::new(name, FieldType::Variable { prefix })
    }

    /// The protocol-definition `count` of this field.
    ///
    /// Byte length for fixed arrays, prefix width for variable arrays, `1` otherwise.
    #[must_use]
    pub const fn count(&self) -> usize {
        match self.ty {
            FieldType::Fixed { len } => len,
            FieldType::Variable { prefix } => prefix.width(),
            _ => 1,
        }
    }
}
