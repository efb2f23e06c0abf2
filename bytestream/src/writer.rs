//! Byte-level writer for encoding packed binary data.

use crate::error::{ByteError, ByteResult};

/// A bounded byte-level writer over a caller-provided buffer.
///
/// Writes that do not fit in the remaining capacity fail with
/// [`ByteError::BufferOverflow`] and leave the buffer untouched.
/// Call [`finish`](Self::finish) to get the number of bytes written.
#[derive(Debug)]
pub struct ByteWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> ByteWriter<'a> {
    /// Creates a new `ByteWriter` writing from the start of `buf`.
    #[must_use]
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Returns the number of bytes written so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the remaining capacity in bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }

    /// Writes raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> ByteResult<()> {
        let available = self.remaining();
        if bytes.len() > available {
            return Err(ByteError::BufferOverflow {
                requested: bytes.len(),
                available,
            });
        }
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    /// Writes a `u8`.
    pub fn write_u8(&mut self, value: u8) -> ByteResult<()> {
        self.write_bytes(&[value])
    }

    /// Writes an `i8`.
    pub fn write_i8(&mut self, value: i8) -> ByteResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a little-endian `u16`.
    pub fn write_u16_le(&mut self, value: u16) -> ByteResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a big-endian (network order) `u16`.
    pub fn write_u16_be(&mut self, value: u16) -> ByteResult<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Writes a little-endian `i16`.
    pub fn write_i16_le(&mut self, value: i16) -> ByteResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a little-endian `u32`.
    pub fn write_u32_le(&mut self, value: u32) -> ByteResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a big-endian (network order) `u32`.
    pub fn write_u32_be(&mut self, value: u32) -> ByteResult<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Writes a little-endian `i32`.
    pub fn write_i32_le(&mut self, value: i32) -> ByteResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a little-endian `u64`.
    pub fn write_u64_le(&mut self, value: u64) -> ByteResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a little-endian IEEE-754 `f32`.
    pub fn write_f32_le(&mut self, value: f32) -> ByteResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a little-endian IEEE-754 `f64`.
    pub fn write_f64_le(&mut self, value: f64) -> ByteResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Overwrites a byte that was already written.
    ///
    /// Used to back-fill a count byte reserved before its value was known.
    pub fn patch_u8(&mut self, position: usize, value: u8) -> ByteResult<()> {
        if position >= self.pos {
            return Err(ByteError::PatchOutOfRange {
                position,
                written: self.pos,
            });
        }
        self.buf[position] = value;
        Ok(())
    }

    /// Finishes writing and returns the number of bytes written.
    #[must_use]
    pub const fn finish(self) -> usize {
        self.pos
    }
}
