//! Packet encoding and MTU-bounded fragmentation.

use bytestream::ByteWriter;
use schema::MapPacket;
use tracing::{debug, trace};
use wire::{encode_header, Limits, PacketFlags, PacketHeader};

use crate::block::{block_len, entry_len, write_block, write_entry};
use crate::error::{CodecError, CodecResult, UnfragmentableReason};
use crate::value::Packet;

/// Encodes a packet instance into one or more datagrams.
///
/// The header's `frequency` and `id` must identify `schema`; its reliable and
/// zero-coded flags are taken from `schema`. Every returned buffer starts with
/// the header and is at most `limits.mtu` bytes.
///
/// A packet that fits the MTU is emitted whole. A larger one is split: each
/// fragment repeats the header and every single and fixed-multiple block, then
/// carries as many whole occurrences of each variable block as fit, with a
/// per-fragment occurrence count. Variable blocks fill in schema order, so an
/// earlier block may use up a fragment and leave a later one for the next.
/// Fragments share the header's sequence number; re-stamp them with
/// [`wire::stamp_sequence`] before sending.
///
/// The whole instance is validated before any buffer is produced: on error
/// nothing is returned.
pub fn encode_packet(
    schema: &MapPacket,
    header: &PacketHeader,
    packet: &Packet,
    limits: &Limits,
) -> CodecResult<Vec<Vec<u8>>> {
    let header = outgoing_header(schema, header)?;
    if packet.blocks.len() != schema.blocks.len() {
        return Err(CodecError::BlockCountMismatch {
            packet: schema.name.clone(),
            expected: schema.blocks.len(),
            actual: packet.blocks.len(),
        });
    }

    let block_lens = schema
        .blocks
        .iter()
        .zip(&packet.blocks)
        .map(|(block, data)| block_len(block, data))
        .collect::<CodecResult<Vec<_>>>()?;
    let total_len = header.encoded_len() + block_lens.iter().sum::<usize>();

    if total_len <= limits.mtu {
        let mut buf = vec![0u8; total_len];
        let mut writer = ByteWriter::new(&mut buf);
        encode_header(&header, &mut writer)?;
        for (block, data) in schema.blocks.iter().zip(&packet.blocks) {
            write_block(block, data, &mut writer)?;
        }
        debug_assert_eq!(writer.finish(), total_len);
        return Ok(vec![buf]);
    }

    if schema.cannot_multiple() {
        return Err(CodecError::Unfragmentable {
            packet: schema.name.clone(),
            len: total_len,
            reason: UnfragmentableReason::TrailingFixedBlock,
        });
    }

    encode_fragments(schema, &header, packet, &block_lens, total_len, limits.mtu)
}

fn outgoing_header(schema: &MapPacket, header: &PacketHeader) -> CodecResult<PacketHeader> {
    if header.frequency != schema.frequency || header.id != schema.id {
        return Err(CodecError::HeaderMismatch {
            packet: schema.name.clone(),
            frequency: header.frequency,
            id: header.id,
        });
    }
    // Appended acks belong to the transport, which sets the flag itself.
    let header = PacketHeader {
        flags: header.flags.with(PacketFlags::ACK, false),
        ..*header
    };
    Ok(header
        .reliable(schema.reliable)
        .zero_coded(schema.zero_coded))
}

/// Splits a packet whose variable blocks all trail its fixed blocks.
fn encode_fragments(
    schema: &MapPacket,
    header: &PacketHeader,
    packet: &Packet,
    block_lens: &[usize],
    total_len: usize,
    mtu: usize,
) -> CodecResult<Vec<Vec<u8>>> {
    let fixed_end = schema
        .first_variable_block()
        .unwrap_or(schema.blocks.len());
    let variable: Vec<usize> = schema.variable_blocks().collect();

    // Header, fixed blocks, and one count byte per variable block.
    let fixed_len = header.encoded_len() + block_lens[..fixed_end].iter().sum::<usize>();
    let prefix_len = fixed_len + variable.len();
    if prefix_len > mtu {
        return Err(CodecError::Unfragmentable {
            packet: schema.name.clone(),
            len: total_len,
            reason: UnfragmentableReason::FixedPrefixExceedsMtu {
                prefix: prefix_len,
                mtu,
            },
        });
    }

    let capacity = mtu - prefix_len;
    let mut entry_lens = Vec::with_capacity(variable.len());
    for &index in &variable {
        let block = &schema.blocks[index];
        let lens = packet.blocks[index]
            .entries
            .iter()
            .map(|entry| entry_len(block, entry))
            .collect::<CodecResult<Vec<_>>>()?;
        if let Some((position, &len)) = lens.iter().enumerate().find(|&(_, &len)| len > capacity) {
            return Err(CodecError::OccurrenceTooLarge {
                packet: schema.name.clone(),
                block: block.name.clone(),
                index: position,
                len,
                capacity,
            });
        }
        entry_lens.push(lens);
    }

    let mut prefix = vec![0u8; fixed_len];
    let mut writer = ByteWriter::new(&mut prefix);
    encode_header(header, &mut writer)?;
    for (block, data) in schema.blocks[..fixed_end].iter().zip(&packet.blocks) {
        write_block(block, data, &mut writer)?;
    }
    debug_assert_eq!(writer.finish(), fixed_len);

    let mut cursors = vec![0usize; variable.len()];
    let mut fragments = Vec::new();
    while cursors
        .iter()
        .zip(&entry_lens)
        .any(|(&cursor, lens)| cursor < lens.len())
    {
        let mut buf = vec![0u8; mtu.min(total_len)];
        let mut writer = ByteWriter::new(&mut buf);
        writer.write_bytes(&prefix)?;
        let mut used = prefix_len;

        for ((cursor, &index), lens) in cursors.iter_mut().zip(&variable).zip(&entry_lens) {
            let block = &schema.blocks[index];
            let entries = &packet.blocks[index].entries;
            let count_at = writer.position();
            writer.write_u8(0)?;

            let start = *cursor;
            while let Some(&len) = lens.get(*cursor) {
                if used + len > mtu {
                    break;
                }
                write_entry(block, &entries[*cursor], &mut writer)?;
                used += len;
                *cursor += 1;
            }
            writer.patch_u8(count_at, (*cursor - start) as u8)?;
        }

        let len = writer.finish();
        buf.truncate(len);
        trace!(
            packet = %schema.name,
            fragment = fragments.len(),
            len,
            "built fragment"
        );
        fragments.push(buf);
    }

    debug!(
        packet = %schema.name,
        total_len,
        fragments = fragments.len(),
        "fragmented packet"
    );
    Ok(fragments)
}
