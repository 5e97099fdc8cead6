// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Frame codec
//!
//! Frames are the unit of multiplexing inside a protected packet payload.
//! The first byte of every frame discriminates its type:
//!
//! ```text
//! 1 F L OOO II   STREAM   (FIN, data-length-present, offset width, id width)
//! 0 1 N T LL MM  ACK      (NACK, truncated, largest-observed width, missing-delta width)
//! 0 0 1 x xxxx   CONGESTION_FEEDBACK (legacy, reserved, never generated)
//! 0 0 0 value    PADDING / RST_STREAM / CONNECTION_CLOSE / GOAWAY /
//!                WINDOW_UPDATE / BLOCKED / STOP_WAITING / PING (0x00-0x07)
//! ```
//!
//! STOP_WAITING's least-unacked-delta width is not encoded in the frame:
//! the packet assembler supplies the public header's sequence-number width.
//!
//! A STREAM frame without the data-length bit extends to the end of the
//! packet and must therefore be the last frame; PADDING likewise consumes
//! the remainder.

mod ack;
mod control;
mod stream;

pub use ack::{AckFrame, AckTimestamp, MissingRange};
pub use control::StopWaitingFrame;
pub use stream::StreamFrame;

use super::{ByteOffset, ErrorCode, ProtocolError, ProtocolResult, StreamId};

pub(crate) const FRAME_TYPE_STREAM: u8 = 0x80;
pub(crate) const FRAME_MASK_STREAM: u8 = 0x80;
pub(crate) const FRAME_TYPE_ACK: u8 = 0x40;
pub(crate) const FRAME_MASK_ACK: u8 = 0xC0;
pub(crate) const FRAME_TYPE_CONGESTION_FEEDBACK: u8 = 0x20;
pub(crate) const FRAME_MASK_CONGESTION_FEEDBACK: u8 = 0xE0;

pub(crate) const FRAME_TYPE_PADDING: u8 = 0x00;
pub(crate) const FRAME_TYPE_RST_STREAM: u8 = 0x01;
pub(crate) const FRAME_TYPE_CONNECTION_CLOSE: u8 = 0x02;
pub(crate) const FRAME_TYPE_GOAWAY: u8 = 0x03;
pub(crate) const FRAME_TYPE_WINDOW_UPDATE: u8 = 0x04;
pub(crate) const FRAME_TYPE_BLOCKED: u8 = 0x05;
pub(crate) const FRAME_TYPE_STOP_WAITING: u8 = 0x06;
pub(crate) const FRAME_TYPE_PING: u8 = 0x07;

/// Sequence-number style field widths used by ACK frames:
/// code 0..=3 maps to 1/2/4/6 bytes.
pub(crate) fn ack_width_from_code(code: u8) -> usize {
    match code & 0x3 {
        0 => 1,
        1 => 2,
        2 => 4,
        _ => 6,
    }
}

pub(crate) fn ack_code_from_width(width: usize) -> ProtocolResult<u8> {
    match width {
        1 => Ok(0),
        2 => Ok(1),
        4 => Ok(2),
        6 => Ok(3),
        _ => Err(ProtocolError::InvalidInput("width must be 1, 2, 4 or 6")),
    }
}

pub(crate) fn fits_width(value: u64, width: usize) -> bool {
    width >= 8 || value < (1u64 << (width * 8))
}

/// One frame of a framed packet payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Zero bytes to the end of the packet; `length` counts the zero bytes
    /// after the type byte.
    Padding { length: usize },
    Stream(StreamFrame),
    Ack(AckFrame),
    RstStream {
        stream_id: StreamId,
        byte_offset: ByteOffset,
        error_code: ErrorCode,
    },
    ConnectionClose {
        error_code: ErrorCode,
        reason: Vec<u8>,
    },
    GoAway {
        error_code: ErrorCode,
        last_good_stream_id: StreamId,
        reason: Vec<u8>,
    },
    WindowUpdate {
        stream_id: StreamId,
        byte_offset: ByteOffset,
    },
    Blocked { stream_id: StreamId },
    StopWaiting(StopWaitingFrame),
    Ping,
}

impl Frame {
    /// Parse one frame from the head of `data`.
    ///
    /// `seq_num_width` is the public header's sequence-number width,
    /// needed by STOP_WAITING. Returns the frame and consumed byte count.
    pub fn parse(data: &[u8], seq_num_width: usize) -> ProtocolResult<(Frame, usize)> {
        let Some(&ft) = data.first() else {
            return Err(ProtocolError::ShortInput("no frame type byte"));
        };
        if ft & FRAME_MASK_STREAM == FRAME_TYPE_STREAM {
            let (frame, size) = StreamFrame::parse(data)?;
            return Ok((Frame::Stream(frame), size));
        }
        if ft & FRAME_MASK_ACK == FRAME_TYPE_ACK {
            let (frame, size) = AckFrame::parse(data)?;
            return Ok((Frame::Ack(frame), size));
        }
        if ft & FRAME_MASK_CONGESTION_FEEDBACK == FRAME_TYPE_CONGESTION_FEEDBACK {
            return Err(ProtocolError::Unsupported("legacy CONGESTION_FEEDBACK frame"));
        }
        control::parse(ft, data, seq_num_width)
    }

    /// Parse an ordered frame sequence filling `data` completely.
    pub fn parse_sequence(data: &[u8], seq_num_width: usize) -> ProtocolResult<Vec<Frame>> {
        let mut frames = Vec::new();
        let mut offset = 0;
        while offset < data.len() {
            let (frame, size) = Frame::parse(&data[offset..], seq_num_width)?;
            frames.push(frame);
            offset += size;
        }
        Ok(frames)
    }

    pub fn serialized_size(&self, seq_num_width: usize) -> usize {
        match self {
            Frame::Padding { length } => 1 + length,
            Frame::Stream(frame) => frame.serialized_size(),
            Frame::Ack(frame) => frame.serialized_size(),
            Frame::RstStream { .. } => 17,
            Frame::ConnectionClose { reason, .. } => 7 + reason.len(),
            Frame::GoAway { reason, .. } => 11 + reason.len(),
            Frame::WindowUpdate { .. } => 13,
            Frame::Blocked { .. } => 5,
            Frame::StopWaiting(_) => 2 + seq_num_width,
            Frame::Ping => 1,
        }
    }

    /// Serialize into `out`, returning the written byte count.
    pub fn serialize(&self, out: &mut [u8], seq_num_width: usize) -> ProtocolResult<usize> {
        match self {
            Frame::Stream(frame) => frame.serialize(out),
            Frame::Ack(frame) => frame.serialize(out),
            Frame::StopWaiting(frame) => frame.serialize(out, seq_num_width),
            _ => control::serialize(self, out),
        }
    }

    /// A frame whose body extends to the end of the packet, making it
    /// necessarily the last frame.
    fn runs_to_packet_end(&self) -> bool {
        match self {
            Frame::Padding { .. } => true,
            Frame::Stream(frame) => !frame.data_length_present,
            _ => false,
        }
    }

    /// Serialize an ordered frame sequence, returning the total byte count.
    pub fn serialize_sequence(
        frames: &[Frame],
        out: &mut [u8],
        seq_num_width: usize,
    ) -> ProtocolResult<usize> {
        let mut offset = 0;
        for (i, frame) in frames.iter().enumerate() {
            if frame.runs_to_packet_end() && i != frames.len() - 1 {
                return Err(ProtocolError::InvalidInput(
                    "frame extending to the packet end must be last",
                ));
            }
            offset += frame.serialize(&mut out[offset..], seq_num_width)?;
        }
        Ok(offset)
    }
}
