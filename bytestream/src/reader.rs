//! Byte-level reader with bounded operations.

use crate::error::{ByteError, ByteResult};

/// A byte-level reader for decoding packed binary data.
///
/// All read operations are bounds-checked and return errors on failure.
/// A failed read does not advance the cursor. The reader never panics on
/// malformed input.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a new `ByteReader` from a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the number of bytes remaining to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns `true` if there are no more bytes to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the current byte position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the unread tail of the buffer without advancing.
    #[must_use]
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }

    /// Reads exactly `len` bytes, borrowing them from the underlying buffer.
    pub fn read_bytes(&mut self, len: usize) -> ByteResult<&'a [u8]> {
        self.ensure(len)?;
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    /// Reads exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> ByteResult<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Reads a `u8`.
    pub fn read_u8(&mut self) -> ByteResult<u8> {
        let [value] = self.read_array::<1>()?;
        Ok(value)
    }

    /// Reads an `i8`.
    pub fn read_i8(&mut self) -> ByteResult<i8> {
        Ok(i8::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `u16`.
    pub fn read_u16_le(&mut self) -> ByteResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Reads a big-endian (network order) `u16`.
    pub fn read_u16_be(&mut self) -> ByteResult<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    /// Reads a little-endian `i16`.
    pub fn read_i16_le(&mut self) -> ByteResult<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32_le(&mut self) -> ByteResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Reads a big-endian (network order) `u32`.
    pub fn read_u32_be(&mut self) -> ByteResult<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Reads a little-endian `i32`.
    pub fn read_i32_le(&mut self) -> ByteResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `u64`.
    pub fn read_u64_le(&mut self) -> ByteResult<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian IEEE-754 `f32`.
    pub fn read_f32_le(&mut self) -> ByteResult<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian IEEE-754 `f64`.
    pub fn read_f64_le(&mut self) -> ByteResult<f64> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    fn ensure(&self, len: usize) -> ByteResult<()> {
        let available = self.remaining();
        if len > available {
            return Err(ByteError::UnexpectedEof {
                requested: len,
                available,
            });
        }
        Ok(())
    }
}
