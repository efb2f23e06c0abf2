//! Packet definitions.

use wire::{Frequency, PacketHeader};

use crate::block::{Cardinality, MapBlock};

/// A full message layout: identity, flags and ordered blocks.
///
/// The `(frequency, id)` pair is the wire identity. Blocks are encoded in the
/// order they appear here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapPacket {
    pub name: String,
    pub id: u16,
    pub frequency: Frequency,
    pub blocks: Vec<MapBlock>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub reliable: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub zero_coded: bool,
}

impl MapPacket {
    /// Creates a packet with no blocks and no flags.
    #[must_use]
    pub fn new(name: impl Into<String>, frequency: Frequency, id: u16) -> Self {
        Self {
            name: name.into(),
            id,
            frequency,
            blocks: Vec::new(),
            reliable: false,
            zero_coded: false,
        }
    }

    /// Appends a block definition.
    #[must_use]
    pub fn block(mut self, block: MapBlock) -> Self {
        self.blocks.push(block);
        self
    }

    #[must_use]
    pub const fn reliable(mut self, reliable: bool) -> Self {
        self.reliable = reliable;
        self
    }

    #[must_use]
    pub const fn zero_coded(mut self, zero_coded: bool) -> Self {
        self.zero_coded = zero_coded;
        self
    }

    /// Returns `true` if a single or fixed-multiple block follows a variable
    /// block. Such packets must never be split across datagrams.
    #[must_use]
    pub fn cannot_multiple(&self) -> bool {
        let mut seen_variable = false;
        for block in &self.blocks {
            match block.cardinality {
                Cardinality::Variable => seen_variable = true,
                Cardinality::Single | Cardinality::Multiple(_) if seen_variable => return true,
                _ => {}
            }
        }
        false
    }

    /// Index of the first variable block, if any.
    #[must_use]
    pub fn first_variable_block(&self) -> Option<usize> {
        self.blocks.iter().position(MapBlock::is_variable)
    }

    /// Indexes of all variable blocks, in schema order.
    pub fn variable_blocks(&self) -> impl Iterator<Item = usize> + '_ {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, block)| block.is_variable())
            .map(|(index, _)| index)
    }

    /// Looks up a block by name.
    #[must_use]
    pub fn block_index(&self, name: &str) -> Option<usize> {
        self.blocks.iter().position(|block| block.name == name)
    }

    /// A fresh outgoing header for this packet, flags taken from the schema.
    #[must_use]
    pub const fn header(&self, sequence: u32) -> PacketHeader {
        PacketHeader::new(self.frequency, self.id, sequence)
            .reliable(self.reliable)
            .zero_coded(self.zero_coded)
    }
}
