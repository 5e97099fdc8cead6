// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read/write cursors over wire buffers.
//!
//! QUIC fields come in widths the flag bytes dictate at parse time, so
//! the primitive here is a width-parameterized little-endian integer
//! accessor; the fixed-width `u8`/`u16`/`u32`/`u64` helpers are thin
//! wrappers over it. Every access is bounds-checked and a failure
//! reports the cursor position plus the shortfall, which is usually all
//! a packet-drop log line needs.

use super::{SerError, SerResult};

/// Immutable cursor for parsing.
pub struct Cursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    fn want(&self, count: usize) -> SerResult<()> {
        if count > self.remaining() {
            return Err(SerError::UnexpectedEnd { offset: self.offset, needed: count });
        }
        Ok(())
    }

    /// Read a `width`-byte little-endian unsigned integer into a `u64`.
    ///
    /// The wire never self-describes a width; the caller has decoded it
    /// from a flag field. Width 0 is legal and yields 0 (0-byte
    /// connection IDs, omitted byte offsets).
    pub fn read_uint_le(&mut self, width: usize) -> SerResult<u64> {
        debug_assert!(width <= 8);
        self.want(width)?;
        let mut value = 0u64;
        for (shift, &byte) in self.buffer[self.offset..self.offset + width].iter().enumerate() {
            value |= u64::from(byte) << (8 * shift);
        }
        self.offset += width;
        Ok(value)
    }

    pub fn read_u8(&mut self) -> SerResult<u8> {
        Ok(self.read_uint_le(1)? as u8)
    }

    pub fn read_u16_le(&mut self) -> SerResult<u16> {
        Ok(self.read_uint_le(2)? as u16)
    }

    pub fn read_u32_le(&mut self) -> SerResult<u32> {
        Ok(self.read_uint_le(4)? as u32)
    }

    pub fn read_u64_le(&mut self) -> SerResult<u64> {
        self.read_uint_le(8)
    }

    /// Borrow the next `len` bytes of the input.
    pub fn read_bytes(&mut self, len: usize) -> SerResult<&'a [u8]> {
        self.want(len)?;
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    /// Consume and return whatever is left (data-to-end stream frames,
    /// FEC redundancy, padding runs).
    pub fn read_rest(&mut self) -> &'a [u8] {
        let slice = &self.buffer[self.offset..];
        self.offset = self.buffer.len();
        slice
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.offset
    }

    pub fn is_eof(&self) -> bool {
        self.offset == self.buffer.len()
    }
}

/// Mutable cursor for serializing.
pub struct CursorMut<'a> {
    buffer: &'a mut [u8],
    offset: usize,
}

impl<'a> CursorMut<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    fn want(&self, count: usize) -> SerResult<()> {
        if count > self.remaining() {
            return Err(SerError::Overflow { offset: self.offset, needed: count });
        }
        Ok(())
    }

    /// Write the low `width` bytes of `value`, little-endian. Higher
    /// bytes are silently dropped; callers that care validate the value
    /// against its negotiated width first.
    pub fn write_uint_le(&mut self, width: usize, value: u64) -> SerResult<()> {
        debug_assert!(width <= 8);
        self.want(width)?;
        for (shift, slot) in self.buffer[self.offset..self.offset + width].iter_mut().enumerate() {
            *slot = (value >> (8 * shift)) as u8;
        }
        self.offset += width;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> SerResult<()> {
        self.write_uint_le(1, u64::from(value))
    }

    pub fn write_u16_le(&mut self, value: u16) -> SerResult<()> {
        self.write_uint_le(2, u64::from(value))
    }

    pub fn write_u32_le(&mut self, value: u32) -> SerResult<()> {
        self.write_uint_le(4, u64::from(value))
    }

    pub fn write_u64_le(&mut self, value: u64) -> SerResult<()> {
        self.write_uint_le(8, value)
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> SerResult<()> {
        self.want(data.len())?;
        self.buffer[self.offset..self.offset + data.len()].copy_from_slice(data);
        self.offset += data.len();
        Ok(())
    }

    /// Write `count` zero bytes (PADDING frames, value padding).
    pub fn write_zeroes(&mut self, count: usize) -> SerResult<()> {
        self.want(count)?;
        self.buffer[self.offset..self.offset + count].fill(0);
        self.offset += count;
        Ok(())
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.offset
    }
}
