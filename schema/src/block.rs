//! Block definitions and cardinality.

use crate::field::MapField;

/// Maximum occurrence count of a variable block (one-byte count prefix).
pub const MAX_VARIABLE_OCCURRENCES: usize = u8::MAX as usize;

/// How many times a block occurs in a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cardinality {
    /// Always present exactly once.
    Single,
    /// Present exactly `n` times, no count byte on the wire.
    Multiple(usize),
    /// One count byte followed by 0..=255 occurrences.
    Variable,
}

/// A named, repeatable group of fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapBlock {
    pub name: String,
    pub cardinality: Cardinality,
    pub fields: Vec<MapField>,
}

impl MapBlock {
    /// Creates a block with no fields.
    #[must_use]
    pub fn new(name: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            name: name.into(),
            cardinality,
            fields: Vec::new(),
        }
    }

    /// Creates a single-occurrence block.
    #[must_use]
    pub fn single(name: impl Into<String>) -> Self {
        Self::new(name, Cardinality::Single)
    }

    /// Creates a fixed-multiple block.
    #[must_use]
    pub fn multiple(name: impl Into<String>, count: usize) -> Self {
        Self::new(name, Cardinality::Multiple(count))
    }

    /// Creates a variable-count block.
    #[must_use]
    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(name, Cardinality::Variable)
    }

    /// Appends a field definition.
    #[must_use]
    pub fn field(mut self, field: MapField) -> Self {
        self.fields.push(field);
        self
    }

    /// The protocol-definition `count`: `1`, `n`, or `-1` for variable blocks.
    #[must_use]
    pub fn count(&self) -> i32 {
        match self.cardinality {
            Cardinality::Single => 1,
            Cardinality::Multiple(n) => i32::try_from(n).unwrap_or(i32::MAX),
            Cardinality::Variable => -1,
        }
    }

    #[must_use]
    pub const fn is_variable(&self) -> bool {
        matches!(self.cardinality, Cardinality::Variable)
    }

    /// Encoded length of one occurrence, if no field is variable-length.
    #[must_use]
    pub fn fixed_entry_len(&self) -> Option<usize> {
        self.fields
            .iter()
            .try_fold(0usize, |acc, field| Some(acc + field.ty.wire_size()?))
    }
}
