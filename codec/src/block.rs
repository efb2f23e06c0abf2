//! Block-level encoding.

use bytestream::{ByteReader, ByteWriter};
use schema::{Cardinality, MapBlock, MAX_VARIABLE_OCCURRENCES};

use crate::error::{CodecError, CodecResult, ExpectedOccurrences};
use crate::field::{field_len, read_field, write_field};
use crate::value::{BlockData, BlockEntry};

/// Encoded length of one occurrence.
pub fn entry_len(block: &MapBlock, entry: &BlockEntry) -> CodecResult<usize> {
    check_field_count(block, entry)?;
    block
        .fields
        .iter()
        .zip(&entry.fields)
        .try_fold(0, |acc, (field, value)| Ok(acc + field_len(field, value)?))
}

/// Encoded length of a block, including the count byte of variable blocks.
///
/// Also validates cardinality and every value, so a successful call means
/// [`write_block`] cannot fail for lack of a valid instance.
pub fn block_len(block: &MapBlock, data: &BlockData) -> CodecResult<usize> {
    check_cardinality(block, data)?;
    let count_len = usize::from(block.is_variable());
    data.entries
        .iter()
        .try_fold(count_len, |acc, entry| Ok(acc + entry_len(block, entry)?))
}

/// Encodes one occurrence, fields in schema order.
pub fn write_entry(
    block: &MapBlock,
    entry: &BlockEntry,
    writer: &mut ByteWriter<'_>,
) -> CodecResult<()> {
    check_field_count(block, entry)?;
    for (field, value) in block.fields.iter().zip(&entry.fields) {
        write_field(field, value, writer)?;
    }
    Ok(())
}

/// Encodes a whole block.
///
/// Variable blocks lead with a one-byte occurrence count; an empty variable
/// block is that single zero byte.
pub fn write_block(
    block: &MapBlock,
    data: &BlockData,
    writer: &mut ByteWriter<'_>,
) -> CodecResult<()> {
    check_cardinality(block, data)?;
    if block.is_variable() {
        writer.write_u8(data.entries.len() as u8)?;
    }
    for entry in &data.entries {
        write_entry(block, entry, writer)?;
    }
    Ok(())
}

/// Decodes one block.
pub fn read_block(block: &MapBlock, reader: &mut ByteReader<'_>) -> CodecResult<BlockData> {
    let occurrences = match block.cardinality {
        Cardinality::Single => 1,
        Cardinality::Multiple(count) => count,
        Cardinality::Variable => usize::from(reader.read_u8()?),
    };
    let mut entries = Vec::with_capacity(occurrences.min(MAX_VARIABLE_OCCURRENCES));
    for _ in 0..occurrences {
        let fields = block
            .fields
            .iter()
            .map(|field| read_field(field, reader))
            .collect::<CodecResult<Vec<_>>>()?;
        entries.push(BlockEntry::new(fields));
    }
    Ok(BlockData::new(entries))
}

fn check_cardinality(block: &MapBlock, data: &BlockData) -> CodecResult<()> {
    let actual = data.entries.len();
    let expected = match block.cardinality {
        Cardinality::Single => ExpectedOccurrences::Exactly(1),
        Cardinality::Multiple(count) => ExpectedOccurrences::Exactly(count),
        Cardinality::Variable => ExpectedOccurrences::AtMost(MAX_VARIABLE_OCCURRENCES),
    };
    let ok = match expected {
        ExpectedOccurrences::Exactly(count) => actual == count,
        ExpectedOccurrences::AtMost(max) => actual <= max,
    };
    if ok {
        Ok(())
    } else {
        Err(CodecError::CardinalityMismatch {
            block: block.name.clone(),
            expected,
            actual,
        })
    }
}

fn check_field_count(block: &MapBlock, entry: &BlockEntry) -> CodecResult<()> {
    if entry.fields.len() == block.fields.len() {
        Ok(())
    } else {
        Err(CodecError::FieldCountMismatch {
            block: block.name.clone(),
            expected: block.fields.len(),
            actual: entry.fields.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;
    use schema::{FieldType, LengthPrefix, MapField};

    fn encode(block: &MapBlock, data: &BlockData) -> Vec<u8> {
        let mut buf = vec![0u8; 8192];
        let mut writer = ByteWriter::new(&mut buf);
        write_block(block, data, &mut writer).unwrap();
        let len = writer.finish();
        assert_eq!(len, block_len(block, data).unwrap());
        buf.truncate(len);
        buf
    }

    fn ids() -> MapBlock {
        MapBlock::variable("ObjectData").field(MapField::new("ObjectLocalID", FieldType::U32))
    }

    fn id_entry(id: u32) -> BlockEntry {
        BlockEntry::new(vec![FieldValue::U32(id)])
    }

    #[test]
    fn empty_variable_block_is_one_zero_byte() {
        let bytes = encode(&ids(), &BlockData::default());
        assert_eq!(bytes, vec![0]);
        let mut reader = ByteReader::new(&bytes);
        assert!(read_block(&ids(), &mut reader).unwrap().is_empty());
        assert!(reader.is_empty());
    }

    #[test]
    fn variable_block_with_255_entries_round_trips() {
        let data = BlockData::new((0..255).map(id_entry).collect());
        let bytes = encode(&ids(), &data);
        assert_eq!(bytes[0], 255);
        assert_eq!(bytes.len(), 1 + 255 * 4);
        let decoded = read_block(&ids(), &mut ByteReader::new(&bytes)).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn variable_block_rejects_256_entries() {
        let data = BlockData::new((0..256).map(id_entry).collect());
        let err = block_len(&ids(), &data).unwrap_err();
        assert!(matches!(
            err,
            CodecError::CardinalityMismatch {
                expected: ExpectedOccurrences::AtMost(255),
                actual: 256,
                ..
            }
        ));
    }

    #[test]
    fn multiple_block_has_no_count_byte() {
        let block = MapBlock::multiple("Pair", 2).field(MapField::new("Value", FieldType::U8));
        let data = BlockData::new(vec![
            BlockEntry::new(vec![FieldValue::U8(7)]),
            BlockEntry::new(vec![FieldValue::U8(9)]),
        ]);
        let bytes = encode(&block, &data);
        assert_eq!(bytes, vec![7, 9]);
        assert_eq!(
            read_block(&block, &mut ByteReader::new(&bytes)).unwrap(),
            data
        );
    }

    #[test]
    fn multiple_block_requires_exact_count() {
        let block = MapBlock::multiple("Pair", 2).field(MapField::new("Value", FieldType::U8));
        let data = BlockData::single(vec![FieldValue::U8(7)]);
        assert!(matches!(
            block_len(&block, &data).unwrap_err(),
            CodecError::CardinalityMismatch {
                expected: ExpectedOccurrences::Exactly(2),
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn single_block_requires_one_entry() {
        let block = MapBlock::single("AgentData").field(MapField::new("AgentID", FieldType::Uuid));
        assert!(matches!(
            block_len(&block, &BlockData::default()).unwrap_err(),
            CodecError::CardinalityMismatch { actual: 0, .. }
        ));
    }

    #[test]
    fn entry_field_count_checked() {
        let block = MapBlock::single("Data")
            .field(MapField::new("A", FieldType::U8))
            .field(MapField::new("B", FieldType::U8));
        let data = BlockData::single(vec![FieldValue::U8(1)]);
        assert!(matches!(
            block_len(&block, &data).unwrap_err(),
            CodecError::FieldCountMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn entry_len_with_variable_field_is_per_instance() {
        let block = MapBlock::variable("Names")
            .field(MapField::new("ID", FieldType::Uuid))
            .field(MapField::variable("Name", LengthPrefix::U8));
        let short = BlockEntry::new(vec![
            FieldValue::Uuid(uuid::Uuid::nil()),
            FieldValue::Variable(b"Ann".to_vec()),
        ]);
        let long = BlockEntry::new(vec![
            FieldValue::Uuid(uuid::Uuid::nil()),
            FieldValue::Variable(b"Bartholomew".to_vec()),
        ]);
        assert_eq!(entry_len(&block, &short).unwrap(), 16 + 1 + 3);
        assert_eq!(entry_len(&block, &long).unwrap(), 16 + 1 + 11);
        let data = BlockData::new(vec![short, long]);
        assert_eq!(block_len(&block, &data).unwrap(), 1 + 20 + 28);
    }

    #[test]
    fn truncated_block_fails() {
        let bytes = [3, 1, 0, 0, 0, 2, 0];
        assert!(read_block(&ids(), &mut ByteReader::new(&bytes)).is_err());
    }
}
