// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! STREAM frame codec.
//!
//! ```text
//! type byte: 1 | FIN | LEN | OOO | II
//! body:      StreamID (1-4B) | ByteOffset (0, 2-8B) | [DataLen u16] | data
//! ```
//!
//! Offset width code 0 means no offset bytes on the wire (offset 0);
//! codes 1-7 map to 2-8 bytes. Stream-ID width code is width minus one.
//! Without the LEN bit the data runs to the end of the decrypted payload,
//! so such a frame must be the last one in the packet.

use super::super::{ByteOffset, ProtocolError, ProtocolResult, StreamId};
use super::{fits_width, FRAME_TYPE_STREAM};
use crate::core::ser::{Cursor, CursorMut};

/// STREAM frame: a span of stream bytes, possibly closing the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamFrame {
    pub fin: bool,
    /// Whether the wire form carries an explicit 16-bit data length.
    pub data_length_present: bool,
    pub stream_id: StreamId,
    pub stream_id_width: usize,
    pub byte_offset: ByteOffset,
    /// 0 (offset omitted) or 2..=8.
    pub byte_offset_width: usize,
    pub data: Vec<u8>,
}

impl StreamFrame {
    /// Build a frame choosing the smallest wire widths for the stream ID
    /// and byte offset.
    pub fn with_minimal_widths(
        stream_id: StreamId,
        byte_offset: ByteOffset,
        fin: bool,
        data: Vec<u8>,
    ) -> Self {
        let stream_id_width = match stream_id {
            0..=0xFF => 1,
            0x100..=0xFFFF => 2,
            0x1_0000..=0xFF_FFFF => 3,
            _ => 4,
        };
        let byte_offset_width = if byte_offset == 0 {
            0
        } else {
            let mut width = 2;
            while width < 8 && !fits_width(byte_offset, width) {
                width += 1;
            }
            width
        };
        StreamFrame {
            fin,
            data_length_present: true,
            stream_id,
            stream_id_width,
            byte_offset,
            byte_offset_width,
            data,
        }
    }

    /// Parse a STREAM frame from the head of `data` (type byte included).
    pub fn parse(data: &[u8]) -> ProtocolResult<(StreamFrame, usize)> {
        let Some(&ft) = data.first() else {
            return Err(ProtocolError::ShortInput("no frame type byte"));
        };
        let fin = ft & 0x40 != 0;
        let data_length_present = ft & 0x20 != 0;
        let offset_code = (ft >> 2) & 0x7;
        let byte_offset_width = if offset_code == 0 { 0 } else { offset_code as usize + 1 };
        let stream_id_width = (ft & 0x3) as usize + 1;

        let mut cursor = Cursor::new(&data[1..]);
        let stream_id = cursor.read_uint_le(stream_id_width)? as StreamId;
        let byte_offset = cursor.read_uint_le(byte_offset_width)?;
        let payload = if data_length_present {
            let data_length = cursor.read_u16_le()? as usize;
            cursor.read_bytes(data_length)?.to_vec()
        } else {
            // Data-to-end form: everything left belongs to this frame.
            cursor.read_rest().to_vec()
        };
        let size = 1 + cursor.offset();
        Ok((
            StreamFrame {
                fin,
                data_length_present,
                stream_id,
                stream_id_width,
                byte_offset,
                byte_offset_width,
                data: payload,
            },
            size,
        ))
    }

    pub fn serialized_size(&self) -> usize {
        let mut size = 1 + self.stream_id_width + self.byte_offset_width + self.data.len();
        if self.data_length_present {
            size += 2;
        }
        size
    }

    pub fn serialize(&self, out: &mut [u8]) -> ProtocolResult<usize> {
        if self.stream_id_width == 0 || self.stream_id_width > 4 {
            return Err(ProtocolError::InvalidInput("stream ID width must be 1-4"));
        }
        if self.byte_offset_width == 1 || self.byte_offset_width > 8 {
            return Err(ProtocolError::InvalidInput("byte offset width must be 0 or 2-8"));
        }
        if !fits_width(u64::from(self.stream_id), self.stream_id_width) {
            return Err(ProtocolError::InvalidInput("stream ID exceeds its wire width"));
        }
        if !fits_width(self.byte_offset, self.byte_offset_width) {
            return Err(ProtocolError::InvalidInput("byte offset exceeds its wire width"));
        }
        if self.data_length_present && self.data.len() > usize::from(u16::MAX) {
            return Err(ProtocolError::InvalidInput("stream data exceeds 16-bit length"));
        }
        let size = self.serialized_size();
        if out.len() < size {
            return Err(ProtocolError::BufferTooSmall("STREAM frame"));
        }

        let offset_code = if self.byte_offset_width == 0 {
            0
        } else {
            (self.byte_offset_width - 1) as u8
        };
        let mut ft = FRAME_TYPE_STREAM | (offset_code << 2) | (self.stream_id_width as u8 - 1);
        if self.fin {
            ft |= 0x40;
        }
        if self.data_length_present {
            ft |= 0x20;
        }
        out[0] = ft;

        let mut cursor = CursorMut::new(&mut out[1..size]);
        cursor.write_uint_le(self.stream_id_width, u64::from(self.stream_id))?;
        cursor.write_uint_le(self.byte_offset_width, self.byte_offset)?;
        if self.data_length_present {
            cursor.write_u16_le(self.data.len() as u16)?;
        }
        cursor.write_bytes(&self.data)?;
        Ok(size)
    }
}
