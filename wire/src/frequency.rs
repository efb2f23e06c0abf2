//! Frequency namespaces for packet IDs.

use std::fmt;

use bytestream::{ByteReader, ByteWriter};

use crate::error::{MessageNumberReason, WireError, WireResult};

/// Escape byte that prefixes medium and low frequency message numbers.
pub const FREQUENCY_ESCAPE: u8 = 0xFF;

/// One of the three independent packet ID namespaces.
///
/// The same numeric ID can name different packets in different frequencies.
/// On the wire the frequency is implied by the message number encoding:
///
/// | Frequency | Bytes | Layout                         |
/// |-----------|-------|--------------------------------|
/// | High      | 1     | `id`                           |
/// | Medium    | 2     | `0xFF id`                      |
/// | Low       | 4     | `0xFF 0xFF id_hi id_lo`        |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Frequency {
    High,
    Medium,
    Low,
}

impl Frequency {
    /// All frequencies, most to least frequent.
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Encoded length of the message number in bytes.
    #[must_use]
    pub const fn id_len(self) -> usize {
        match self {
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 4,
        }
    }

    /// Largest ID representable in this namespace.
    #[must_use]
    pub const fn max_id(self) -> u16 {
        match self {
            Self::High | Self::Medium => 0xFE,
            Self::Low => u16::MAX,
        }
    }

    /// Returns `true` if `id` can be encoded in this namespace.
    #[must_use]
    pub const fn is_valid_id(self, id: u16) -> bool {
        id != 0 && id <= self.max_id()
    }

    /// Short lowercase name, as used in protocol definitions.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        };
        write!(f, "{name}")
    }
}

/// Writes a frequency-scoped message number.
pub fn write_message_number(
    frequency: Frequency,
    id: u16,
    writer: &mut ByteWriter<'_>,
) -> WireResult<()> {
    if !frequency.is_valid_id(id) {
        return Err(WireError::InvalidPacketId { frequency, id });
    }
    match frequency {
        Frequency::High => writer.write_u8(id as u8)?,
        Frequency::Medium => {
            writer.write_u8(FREQUENCY_ESCAPE)?;
            writer.write_u8(id as u8)?;
        }
        Frequency::Low => {
            writer.write_u8(FREQUENCY_ESCAPE)?;
            writer.write_u8(FREQUENCY_ESCAPE)?;
            writer.write_u16_be(id)?;
        }
    }
    Ok(())
}

/// Reads a frequency-scoped message number.
pub fn read_message_number(reader: &mut ByteReader<'_>) -> WireResult<(Frequency, u16)> {
    let first = reader.read_u8()?;
    if first != FREQUENCY_ESCAPE {
        if first == 0 {
            return Err(WireError::InvalidMessageNumber {
                reason: MessageNumberReason::ZeroHighId,
            });
        }
        return Ok((Frequency::High, u16::from(first)));
    }

    let second = reader.read_u8()?;
    if second != FREQUENCY_ESCAPE {
        if second == 0 {
            return Err(WireError::InvalidMessageNumber {
                reason: MessageNumberReason::ReservedMediumId { id: second },
            });
        }
        return Ok((Frequency::Medium, u16::from(second)));
    }

    let id = reader.read_u16_be()?;
    if id == 0 {
        return Err(WireError::InvalidMessageNumber {
            reason: MessageNumberReason::ZeroLowId,
        });
    }
    Ok((Frequency::Low, id))
}
