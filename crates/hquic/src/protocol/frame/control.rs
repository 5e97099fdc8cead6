// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-layout control frames: PADDING, RST_STREAM, CONNECTION_CLOSE,
//! GOAWAY, WINDOW_UPDATE, BLOCKED, STOP_WAITING, PING.

use super::super::{ProtocolError, ProtocolResult, SequenceNumber};
use super::{
    fits_width, Frame, FRAME_TYPE_BLOCKED, FRAME_TYPE_CONNECTION_CLOSE, FRAME_TYPE_GOAWAY,
    FRAME_TYPE_PADDING, FRAME_TYPE_PING, FRAME_TYPE_RST_STREAM, FRAME_TYPE_STOP_WAITING,
    FRAME_TYPE_WINDOW_UPDATE,
};
use crate::core::ser::{Cursor, CursorMut};

/// STOP_WAITING frame: the sender will not retransmit anything below
/// `largest_observed - least_unacked_delta`, so the receiver can stop
/// NACKing it.
///
/// The delta's wire width is not encoded in the frame; it always matches
/// the public header's sequence-number width, which the packet assembler
/// supplies to `parse`/`serialize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopWaitingFrame {
    pub entropy: u8,
    pub least_unacked_delta: SequenceNumber,
}

impl StopWaitingFrame {
    pub fn parse(data: &[u8], seq_num_width: usize) -> ProtocolResult<(StopWaitingFrame, usize)> {
        let mut cursor = Cursor::new(&data[1..]);
        let entropy = cursor.read_u8()?;
        let least_unacked_delta = cursor.read_uint_le(seq_num_width)?;
        Ok((StopWaitingFrame { entropy, least_unacked_delta }, 1 + cursor.offset()))
    }

    pub fn serialize(&self, out: &mut [u8], seq_num_width: usize) -> ProtocolResult<usize> {
        if !matches!(seq_num_width, 1 | 2 | 4 | 6) {
            return Err(ProtocolError::InvalidInput("sequence number width must be 1, 2, 4 or 6"));
        }
        if !fits_width(self.least_unacked_delta, seq_num_width) {
            return Err(ProtocolError::InvalidInput(
                "least unacked delta exceeds the sequence number width",
            ));
        }
        let size = 2 + seq_num_width;
        if out.len() < size {
            return Err(ProtocolError::BufferTooSmall("STOP_WAITING frame"));
        }
        out[0] = FRAME_TYPE_STOP_WAITING;
        let mut cursor = CursorMut::new(&mut out[1..size]);
        cursor.write_u8(self.entropy)?;
        cursor.write_uint_le(seq_num_width, self.least_unacked_delta)?;
        Ok(size)
    }
}

/// Parse a control frame whose type byte is `ft` (`0x00..=0x07`).
pub(super) fn parse(ft: u8, data: &[u8], seq_num_width: usize) -> ProtocolResult<(Frame, usize)> {
    match ft {
        FRAME_TYPE_PADDING => {
            // Padding runs to the end of the packet.
            Ok((Frame::Padding { length: data.len() - 1 }, data.len()))
        }
        FRAME_TYPE_RST_STREAM => {
            let mut cursor = Cursor::new(&data[1..]);
            let stream_id = cursor.read_u32_le()?;
            let byte_offset = cursor.read_u64_le()?;
            let error_code = cursor.read_u32_le()?;
            Ok((Frame::RstStream { stream_id, byte_offset, error_code }, 17))
        }
        FRAME_TYPE_CONNECTION_CLOSE => {
            let mut cursor = Cursor::new(&data[1..]);
            let error_code = cursor.read_u32_le()?;
            let reason_len = cursor.read_u16_le()? as usize;
            let reason = cursor.read_bytes(reason_len)?.to_vec();
            Ok((Frame::ConnectionClose { error_code, reason }, 1 + cursor.offset()))
        }
        FRAME_TYPE_GOAWAY => {
            let mut cursor = Cursor::new(&data[1..]);
            let error_code = cursor.read_u32_le()?;
            let last_good_stream_id = cursor.read_u32_le()?;
            let reason_len = cursor.read_u16_le()? as usize;
            let reason = cursor.read_bytes(reason_len)?.to_vec();
            Ok((
                Frame::GoAway { error_code, last_good_stream_id, reason },
                1 + cursor.offset(),
            ))
        }
        FRAME_TYPE_WINDOW_UPDATE => {
            let mut cursor = Cursor::new(&data[1..]);
            let stream_id = cursor.read_u32_le()?;
            let byte_offset = cursor.read_u64_le()?;
            Ok((Frame::WindowUpdate { stream_id, byte_offset }, 13))
        }
        FRAME_TYPE_BLOCKED => {
            let mut cursor = Cursor::new(&data[1..]);
            let stream_id = cursor.read_u32_le()?;
            Ok((Frame::Blocked { stream_id }, 5))
        }
        FRAME_TYPE_STOP_WAITING => {
            let (frame, size) = StopWaitingFrame::parse(data, seq_num_width)?;
            Ok((Frame::StopWaiting(frame), size))
        }
        FRAME_TYPE_PING => Ok((Frame::Ping, 1)),
        _ => Err(ProtocolError::InvalidInput("unknown frame type")),
    }
}

/// Serialize a control frame (everything but STREAM/ACK/STOP_WAITING).
pub(super) fn serialize(frame: &Frame, out: &mut [u8]) -> ProtocolResult<usize> {
    match frame {
        Frame::Padding { length } => {
            let size = 1 + length;
            if out.len() < size {
                return Err(ProtocolError::BufferTooSmall("PADDING frame"));
            }
            let mut cursor = CursorMut::new(out);
            cursor.write_u8(FRAME_TYPE_PADDING)?;
            cursor.write_zeroes(*length)?;
            Ok(size)
        }
        Frame::RstStream { stream_id, byte_offset, error_code } => {
            if out.len() < 17 {
                return Err(ProtocolError::BufferTooSmall("RST_STREAM frame"));
            }
            let mut cursor = CursorMut::new(out);
            cursor.write_u8(FRAME_TYPE_RST_STREAM)?;
            cursor.write_u32_le(*stream_id)?;
            cursor.write_u64_le(*byte_offset)?;
            cursor.write_u32_le(*error_code)?;
            Ok(17)
        }
        Frame::ConnectionClose { error_code, reason } => {
            if reason.len() > usize::from(u16::MAX) {
                return Err(ProtocolError::InvalidInput("reason phrase exceeds 16-bit length"));
            }
            let size = 7 + reason.len();
            if out.len() < size {
                return Err(ProtocolError::BufferTooSmall("CONNECTION_CLOSE frame"));
            }
            let mut cursor = CursorMut::new(out);
            cursor.write_u8(FRAME_TYPE_CONNECTION_CLOSE)?;
            cursor.write_u32_le(*error_code)?;
            cursor.write_u16_le(reason.len() as u16)?;
            cursor.write_bytes(reason)?;
            Ok(size)
        }
        Frame::GoAway { error_code, last_good_stream_id, reason } => {
            if reason.len() > usize::from(u16::MAX) {
                return Err(ProtocolError::InvalidInput("reason phrase exceeds 16-bit length"));
            }
            let size = 11 + reason.len();
            if out.len() < size {
                return Err(ProtocolError::BufferTooSmall("GOAWAY frame"));
            }
            let mut cursor = CursorMut::new(out);
            cursor.write_u8(FRAME_TYPE_GOAWAY)?;
            cursor.write_u32_le(*error_code)?;
            cursor.write_u32_le(*last_good_stream_id)?;
            cursor.write_u16_le(reason.len() as u16)?;
            cursor.write_bytes(reason)?;
            Ok(size)
        }
        Frame::WindowUpdate { stream_id, byte_offset } => {
            if out.len() < 13 {
                return Err(ProtocolError::BufferTooSmall("WINDOW_UPDATE frame"));
            }
            let mut cursor = CursorMut::new(out);
            cursor.write_u8(FRAME_TYPE_WINDOW_UPDATE)?;
            cursor.write_u32_le(*stream_id)?;
            cursor.write_u64_le(*byte_offset)?;
            Ok(13)
        }
        Frame::Blocked { stream_id } => {
            if out.len() < 5 {
                return Err(ProtocolError::BufferTooSmall("BLOCKED frame"));
            }
            let mut cursor = CursorMut::new(out);
            cursor.write_u8(FRAME_TYPE_BLOCKED)?;
            cursor.write_u32_le(*stream_id)?;
            Ok(5)
        }
        Frame::Ping => {
            if out.is_empty() {
                return Err(ProtocolError::BufferTooSmall("PING frame"));
            }
            out[0] = FRAME_TYPE_PING;
            Ok(1)
        }
        Frame::Stream(_) | Frame::Ack(_) | Frame::StopWaiting(_) => {
            unreachable!("dispatched by Frame::serialize")
        }
    }
}
