//! Buffer utilities for reading and writing the record wire format.
//!
//! All multi-byte integers are big-endian. Variable-length payloads carry a
//! 4-byte length prefix.

use crate::error::{Error, Result};
use bytes::{BufMut, Bytes, BytesMut};

/// A buffer for reading wire data.
pub struct ReadBuffer {
    data: Bytes,
    pos: usize,
}

impl ReadBuffer {
    /// Create a new read buffer from bytes.
    pub fn new(data: Bytes) -> Self {
        Self { data, pos: 0 }
    }

    /// Get the current position in the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Get the remaining bytes in the buffer.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Check if the buffer has at least `n` bytes remaining.
    pub fn has_remaining(&self, n: usize) -> bool {
        self.remaining() >= n
    }

    #[track_caller]
    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        if !self.has_remaining(N) {
            return Err(Error::buffer_too_small(N, self.remaining()));
        }
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(bytes)
    }

    /// Read a single byte.
    #[track_caller]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take::<1>()?[0])
    }

    /// Read a boolean byte; any non-zero value is `true`.
    #[track_caller]
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Read a big-endian u32.
    #[track_caller]
    pub fn read_u32_be(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.take()?))
    }

    /// Read a big-endian i32.
    #[track_caller]
    pub fn read_i32_be(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.take()?))
    }

    /// Read a big-endian i64.
    #[track_caller]
    pub fn read_i64_be(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.take()?))
    }

    /// Read a big-endian IEEE 754 single.
    #[track_caller]
    pub fn read_f32_be(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32_be()?))
    }

    /// Read a big-endian IEEE 754 double.
    #[track_caller]
    pub fn read_f64_be(&mut self) -> Result<f64> {
        Ok(f64::from_bits(u64::from_be_bytes(self.take()?)))
    }

    /// Read raw bytes.
    #[track_caller]
    pub fn read_bytes(&mut self, n: usize) -> Result<Bytes> {
        if !self.has_remaining(n) {
            return Err(Error::buffer_too_small(n, self.remaining()));
        }
        let bytes = self.data.slice(self.pos..self.pos + n);
        self.pos += n;
        Ok(bytes)
    }

    /// Read bytes with a 4-byte length prefix.
    #[track_caller]
    pub fn read_bytes_with_length(&mut self) -> Result<Bytes> {
        let length = self.read_u32_be()? as usize;
        self.read_bytes(length)
    }

    /// Read a UTF-8 string with a 4-byte length prefix.
    #[track_caller]
    pub fn read_str_with_length(&mut self) -> Result<String> {
        let bytes = self.read_bytes_with_length()?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::protocol(format!("Invalid UTF-8 in string field: {}", e)))
    }
}

/// A buffer for writing wire data.
pub struct WriteBuffer {
    data: BytesMut,
}

impl WriteBuffer {
    /// Create a new write buffer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a new write buffer with specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
        }
    }

    /// Get the current length of the buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the buffer contents as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Freeze the buffer into immutable bytes.
    pub fn freeze(self) -> Bytes {
        self.data.freeze()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Write a single byte.
    pub fn write_u8(&mut self, val: u8) {
        self.data.put_u8(val);
    }

    /// Write a boolean as one byte.
    pub fn write_bool(&mut self, val: bool) {
        self.data.put_u8(val as u8);
    }

    /// Write a big-endian u32.
    pub fn write_u32_be(&mut self, val: u32) {
        self.data.put_u32(val);
    }

    /// Write a big-endian i32.
    pub fn write_i32_be(&mut self, val: i32) {
        self.data.put_i32(val);
    }

    /// Write a big-endian i64.
    pub fn write_i64_be(&mut self, val: i64) {
        self.data.put_i64(val);
    }

    /// Write a big-endian IEEE 754 single.
    pub fn write_f32_be(&mut self, val: f32) {
        self.data.put_f32(val);
    }

    /// Write a big-endian IEEE 754 double.
    pub fn write_f64_be(&mut self, val: f64) {
        self.data.put_f64(val);
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Write bytes with a 4-byte length prefix.
    pub fn write_bytes_with_length(&mut self, bytes: &[u8]) -> Result<()> {
        let len = u32::try_from(bytes.len()).map_err(|_| {
            Error::protocol(format!("Field of {} bytes exceeds the wire limit", bytes.len()))
        })?;
        self.write_u32_be(len);
        self.write_bytes(bytes);
        Ok(())
    }

    /// Write a string with a 4-byte length prefix.
    pub fn write_str_with_length(&mut self, s: &str) -> Result<()> {
        self.write_bytes_with_length(s.as_bytes())
    }
}

impl Default for WriteBuffer {
    fn default() -> Self {
        Self::new()
    }
}
