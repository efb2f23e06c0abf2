//! Introspection and debugging tools for the lludp codec.
//!
//! This crate backs the `lludp-tools` binary:
//!
//! - Inspect a captured datagram: header, body size, per-block sizes
//! - Decode a datagram into structured JSON (or a readable listing)
//! - Encode structured JSON back into MTU-sized datagrams
//!
//! Datagrams are expected to be zero-decoded already; the tools never expand
//! zero-coded bodies themselves.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use bytestream::ByteReader;
use codec::{encode_packet, from_structured, read_block, to_structured};
use schema::{Cardinality, MapPacket, Protocol};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use wire::{decode_header, split_datagram, stamp_sequence, Limits, PacketHeader};

/// Loads a protocol table from a JSON file, or the bundled sample table.
pub fn load_protocol(path: Option<&Path>) -> Result<Protocol> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("read protocol {}", path.display()))?;
            parse_protocol(&contents)
        }
        None => sample_protocol::protocol().context("build sample protocol"),
    }
}

/// Parses and validates a JSON protocol table.
pub fn parse_protocol(json: &str) -> Result<Protocol> {
    let protocol: Protocol = serde_json::from_str(json).context("parse protocol json")?;
    debug!(
        packets = protocol.len(),
        fingerprint = format_args!("{:016x}", protocol.fingerprint()),
        "protocol loaded"
    );
    Ok(protocol)
}

/// Summary of one datagram.
#[derive(Debug, Clone, PartialEq)]
pub struct InspectReport {
    pub header: PacketHeader,
    pub header_len: usize,
    /// Message bytes, excluding header and appended acknowledgements.
    pub body_len: usize,
    pub appended_acks: Vec<u32>,
    /// Present when a protocol was supplied and knows the packet.
    pub packet: Option<PacketSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PacketSummary {
    pub name: String,
    pub blocks: Vec<BlockSummary>,
    /// Body bytes left after the last block.
    pub trailing: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockSummary {
    pub name: String,
    pub cardinality: Cardinality,
    pub occurrences: usize,
    pub byte_len: usize,
}

/// Inspects a datagram, summarizing its blocks when `protocol` knows it.
///
/// An unknown packet type is not an error here: the report simply has no
/// packet summary.
pub fn inspect_datagram(bytes: &[u8], protocol: Option<&Protocol>) -> Result<InspectReport> {
    let datagram = split_datagram(bytes).context("split datagram")?;
    // Includes any extra-header bytes the sender announced.
    let (_, header_len) = decode_header(bytes)?;
    let body_len = datagram.body.len();

    let packet = match protocol {
        Some(protocol) => match protocol.lookup(datagram.header.frequency, datagram.header.id) {
            Some(schema) => Some(summarize(schema, datagram.body)?),
            None => {
                warn!(
                    frequency = %datagram.header.frequency,
                    id = datagram.header.id,
                    "packet type not in protocol"
                );
                None
            }
        },
        None => None,
    };

    Ok(InspectReport {
        header: datagram.header,
        header_len,
        body_len,
        appended_acks: datagram.appended_acks,
        packet,
    })
}

/// Sizes come from the reader, so anything the decoder accepts is reported
/// as received.
fn summarize(schema: &MapPacket, body: &[u8]) -> Result<PacketSummary> {
    let mut reader = ByteReader::new(body);
    let mut blocks = Vec::with_capacity(schema.blocks.len());
    for block in &schema.blocks {
        let start = reader.position();
        let data = read_block(block, &mut reader)
            .with_context(|| format!("decode {}.{}", schema.name, block.name))?;
        blocks.push(BlockSummary {
            name: block.name.clone(),
            cardinality: block.cardinality,
            occurrences: data.len(),
            byte_len: reader.position() - start,
        });
    }
    Ok(PacketSummary {
        name: schema.name.clone(),
        blocks,
        trailing: reader.remaining(),
    })
}

/// Human-readable rendering of an [`InspectReport`].
pub fn format_inspect_report(report: &InspectReport) -> String {
    let header = &report.header;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "message: {} {} flags: 0x{:02x} [{}] sequence: {}",
        header.frequency,
        header.id,
        header.flags.raw(),
        flag_names(header).join(","),
        header.sequence
    );
    let _ = writeln!(
        out,
        "header: {} bytes body: {} bytes",
        report.header_len, report.body_len
    );
    if !report.appended_acks.is_empty() {
        let _ = writeln!(out, "appended acks: {:?}", report.appended_acks);
    }
    match &report.packet {
        Some(summary) => {
            let _ = writeln!(out, "packet: {}", summary.name);
            for block in &summary.blocks {
                let _ = writeln!(
                    out,
                    "  {} ({}): {} occurrences ({} bytes)",
                    block.name,
                    cardinality_label(block.cardinality),
                    block.occurrences,
                    block.byte_len
                );
            }
            if summary.trailing > 0 {
                let _ = writeln!(out, "  trailing: {} bytes", summary.trailing);
            }
        }
        None => {
            let _ = writeln!(out, "packet: unknown");
        }
    }
    out.truncate(out.trim_end().len());
    out
}

fn cardinality_label(cardinality: Cardinality) -> String {
    match cardinality {
        Cardinality::Single => "single".to_string(),
        Cardinality::Multiple(n) => format!("multiple {n}"),
        Cardinality::Variable => "variable".to_string(),
    }
}

fn flag_names(header: &PacketHeader) -> Vec<&'static str> {
    let flags = header.flags;
    [
        (flags.is_zero_coded(), "zerocoded"),
        (flags.is_reliable(), "reliable"),
        (flags.is_resent(), "resent"),
        (flags.has_appended_acks(), "ack"),
    ]
    .into_iter()
    .filter_map(|(set, name)| set.then_some(name))
    .collect()
}

/// Header flags in structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlagsOutput {
    pub reliable: bool,
    pub resent: bool,
    pub zero_coded: bool,
}

/// A decoded datagram as structured data.
///
/// The same shape is accepted back by [`encode_json_packet`], so decode
/// output can be edited and re-encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeOutput {
    pub packet: String,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub id: Option<u16>,
    #[serde(default)]
    pub sequence: u32,
    #[serde(default)]
    pub flags: FlagsOutput,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub appended_acks: Vec<u32>,
    pub blocks: Value,
}

/// Decodes one datagram into structured output.
pub fn decode_datagram_json(bytes: &[u8], protocol: &Protocol) -> Result<DecodeOutput> {
    let decoded = codec::decode_datagram(protocol, bytes).context("decode datagram")?;
    let blocks = to_structured(decoded.schema, &decoded.packet)?;
    let flags = decoded.header.flags;
    Ok(DecodeOutput {
        packet: decoded.schema.name.clone(),
        frequency: Some(decoded.header.frequency.to_string()),
        id: Some(decoded.header.id),
        sequence: decoded.header.sequence,
        flags: FlagsOutput {
            reliable: flags.is_reliable(),
            resent: flags.is_resent(),
            zero_coded: flags.is_zero_coded(),
        },
        appended_acks: decoded.appended_acks,
        blocks,
    })
}

/// Readable listing of decoded output, in layout order.
pub fn format_decode_pretty(protocol: &Protocol, output: &DecodeOutput) -> Result<String> {
    let schema = protocol
        .by_name(&output.packet)
        .ok_or_else(|| anyhow!("unknown packet {}", output.packet))?;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} {}) sequence {}",
        schema.name, schema.frequency, schema.id, output.sequence
    );
    for block in &schema.blocks {
        let entries = output
            .blocks
            .get(&block.name)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        if entries.is_empty() {
            let _ = writeln!(out, "  {}: (none)", block.name);
        }
        for (index, entry) in entries.iter().enumerate() {
            let _ = writeln!(out, "  {}[{index}]", block.name);
            for field in &block.fields {
                let value = entry.get(&field.name).unwrap_or(&Value::Null);
                let _ = writeln!(out, "    {} = {value}", field.name);
            }
        }
    }
    out.truncate(out.trim_end().len());
    Ok(out)
}

/// Encodes structured input into datagrams ready to send.
///
/// Fragments are stamped with consecutive sequence numbers starting at
/// `input.sequence`.
pub fn encode_json_packet(
    input: &DecodeOutput,
    protocol: &Protocol,
    limits: &Limits,
) -> Result<Vec<Vec<u8>>> {
    let schema = protocol
        .by_name(&input.packet)
        .ok_or_else(|| anyhow!("unknown packet {}", input.packet))?;
    if let Some(id) = input.id {
        if id != schema.id {
            bail!("{} has id {}, input says {id}", schema.name, schema.id);
        }
    }
    let packet = from_structured(schema, &input.blocks)?;
    let mut buffers = encode_packet(schema, &schema.header(input.sequence), &packet, limits)
        .with_context(|| format!("encode {}", schema.name))?;
    for (sequence, buf) in (input.sequence..).zip(buffers.iter_mut()) {
        stamp_sequence(buf, sequence)?;
    }
    Ok(buffers)
}

/// One line per packet type, followed by the protocol fingerprint.
pub fn format_protocol_table(protocol: &Protocol) -> String {
    let mut packets: Vec<_> = protocol.packets().iter().collect();
    packets.sort_by_key(|packet| (packet.frequency, packet.id));
    let mut out = String::new();
    for packet in packets {
        let mut traits = Vec::new();
        if packet.reliable {
            traits.push("reliable");
        }
        if packet.zero_coded {
            traits.push("zerocoded");
        }
        if packet.cannot_multiple() {
            traits.push("unfragmentable");
        }
        let _ = writeln!(
            out,
            "{:<6} {:>5}  {:<32} {} blocks {}",
            packet.frequency.as_str(),
            packet.id,
            packet.name,
            packet.blocks.len(),
            traits.join(",")
        );
    }
    let _ = write!(out, "fingerprint: {:016x}", protocol.fingerprint());
    out
}
