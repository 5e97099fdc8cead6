// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ACK frame codec.
//!
//! ```text
//! type byte: 0 1 | NACK | TRUNC | LL | MM
//! body:      ReceivedEntropy (1B)
//!            LargestObserved (1/2/4/6B)
//!            LargestObservedDeltaTime (2B)
//!            NumTimestamps (1B)
//!              first:      DeltaFromLargestObserved (1B), TimeSinceLargestObserved (4B)
//!              subsequent: DeltaFromLargestObserved (1B), TimeSincePrevious (2B)
//!            if NACK:
//!              NumMissingRanges (1B)
//!                MissingPacketDelta (1/2/4/6B), RangeLength (1B)
//!              NumRevived (1B)
//!                RevivedPacket (LargestObserved width)
//! ```
//!
//! `LL` is the largest-observed width code, `MM` the missing-delta width
//! code (both 1/2/4/6 bytes). All counters are one byte, capping each list
//! at 255 entries per frame.

use super::super::{ProtocolError, ProtocolResult, SequenceNumber};
use super::{ack_code_from_width, ack_width_from_code, fits_width, FRAME_TYPE_ACK};
use crate::core::ser::{Cursor, CursorMut};

/// One receive-timestamp report. The first entry in a frame carries a
/// 32-bit time since the largest observed packet; subsequent entries carry
/// a 16-bit time since the previous entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckTimestamp {
    pub delta_from_largest: u8,
    pub time_delta: u32,
}

/// A run of missing packets: delta below the previous reference and the
/// run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingRange {
    pub delta: SequenceNumber,
    pub length: u8,
}

/// ACK frame: cumulative entropy plus observed/missing/revived packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckFrame {
    pub received_entropy: u8,
    pub largest_observed: SequenceNumber,
    pub largest_observed_width: usize,
    pub largest_observed_delta_time: u16,
    pub timestamps: Vec<AckTimestamp>,
    /// NACK section present on the wire (may be present with zero ranges).
    pub nack: bool,
    /// The peer truncated the missing-range list to fit the packet.
    pub truncated: bool,
    pub missing_delta_width: usize,
    pub missing_ranges: Vec<MissingRange>,
    pub revived: Vec<SequenceNumber>,
}

impl AckFrame {
    /// Plain cumulative ACK with minimal widths and no NACK section.
    pub fn new(largest_observed: SequenceNumber, received_entropy: u8) -> Self {
        let width = [1usize, 2, 4]
            .into_iter()
            .find(|&w| fits_width(largest_observed, w))
            .unwrap_or(6);
        AckFrame {
            received_entropy,
            largest_observed,
            largest_observed_width: width,
            largest_observed_delta_time: 0,
            timestamps: Vec::new(),
            nack: false,
            truncated: false,
            missing_delta_width: 1,
            missing_ranges: Vec::new(),
            revived: Vec::new(),
        }
    }

    /// Parse an ACK frame from the head of `data` (type byte included).
    pub fn parse(data: &[u8]) -> ProtocolResult<(AckFrame, usize)> {
        let Some(&ft) = data.first() else {
            return Err(ProtocolError::ShortInput("no frame type byte"));
        };
        let nack = ft & 0x20 != 0;
        let truncated = ft & 0x10 != 0;
        let largest_observed_width = ack_width_from_code(ft >> 2);
        let missing_delta_width = ack_width_from_code(ft);

        let mut cursor = Cursor::new(&data[1..]);
        let received_entropy = cursor.read_u8()?;
        let largest_observed = cursor.read_uint_le(largest_observed_width)?;
        let largest_observed_delta_time = cursor.read_u16_le()?;

        let num_timestamps = cursor.read_u8()?;
        let mut timestamps = Vec::with_capacity(usize::from(num_timestamps));
        for i in 0..num_timestamps {
            let delta_from_largest = cursor.read_u8()?;
            let time_delta = if i == 0 {
                cursor.read_u32_le()?
            } else {
                u32::from(cursor.read_u16_le()?)
            };
            timestamps.push(AckTimestamp { delta_from_largest, time_delta });
        }

        let mut missing_ranges = Vec::new();
        let mut revived = Vec::new();
        if nack {
            let num_ranges = cursor.read_u8()?;
            missing_ranges.reserve(usize::from(num_ranges));
            for _ in 0..num_ranges {
                let delta = cursor.read_uint_le(missing_delta_width)?;
                let length = cursor.read_u8()?;
                missing_ranges.push(MissingRange { delta, length });
            }
            let num_revived = cursor.read_u8()?;
            revived.reserve(usize::from(num_revived));
            for _ in 0..num_revived {
                revived.push(cursor.read_uint_le(largest_observed_width)?);
            }
        }

        let size = 1 + cursor.offset();
        Ok((
            AckFrame {
                received_entropy,
                largest_observed,
                largest_observed_width,
                largest_observed_delta_time,
                timestamps,
                nack,
                truncated,
                missing_delta_width,
                missing_ranges,
                revived,
            },
            size,
        ))
    }

    pub fn serialized_size(&self) -> usize {
        // type + entropy + largest observed + delta time + timestamp count
        let mut size = 1 + 1 + self.largest_observed_width + 2 + 1;
        for (i, _) in self.timestamps.iter().enumerate() {
            size += if i == 0 { 5 } else { 3 };
        }
        if self.nack {
            size += 1 + self.missing_ranges.len() * (self.missing_delta_width + 1);
            size += 1 + self.revived.len() * self.largest_observed_width;
        }
        size
    }

    pub fn serialize(&self, out: &mut [u8]) -> ProtocolResult<usize> {
        let lo_code = ack_code_from_width(self.largest_observed_width)?;
        let md_code = ack_code_from_width(self.missing_delta_width)?;
        if !fits_width(self.largest_observed, self.largest_observed_width) {
            return Err(ProtocolError::InvalidInput("largest observed exceeds its wire width"));
        }
        if self.timestamps.len() > 255 {
            return Err(ProtocolError::InvalidInput("more than 255 ACK timestamps"));
        }
        if self.missing_ranges.len() > 255 {
            return Err(ProtocolError::InvalidInput("more than 255 missing ranges"));
        }
        if self.revived.len() > 255 {
            return Err(ProtocolError::InvalidInput("more than 255 revived packets"));
        }
        if !self.nack && (!self.missing_ranges.is_empty() || !self.revived.is_empty()) {
            return Err(ProtocolError::InvalidInput("NACK data without NACK flag"));
        }
        let size = self.serialized_size();
        if out.len() < size {
            return Err(ProtocolError::BufferTooSmall("ACK frame"));
        }

        let mut ft = FRAME_TYPE_ACK | (lo_code << 2) | md_code;
        if self.nack {
            ft |= 0x20;
        }
        if self.truncated {
            ft |= 0x10;
        }
        out[0] = ft;

        let mut cursor = CursorMut::new(&mut out[1..size]);
        cursor.write_u8(self.received_entropy)?;
        cursor.write_uint_le(self.largest_observed_width, self.largest_observed)?;
        cursor.write_u16_le(self.largest_observed_delta_time)?;
        cursor.write_u8(self.timestamps.len() as u8)?;
        for (i, ts) in self.timestamps.iter().enumerate() {
            cursor.write_u8(ts.delta_from_largest)?;
            if i == 0 {
                cursor.write_u32_le(ts.time_delta)?;
            } else {
                if ts.time_delta > u32::from(u16::MAX) {
                    return Err(ProtocolError::InvalidInput(
                        "subsequent timestamp delta exceeds 16 bits",
                    ));
                }
                cursor.write_u16_le(ts.time_delta as u16)?;
            }
        }
        if self.nack {
            cursor.write_u8(self.missing_ranges.len() as u8)?;
            for range in &self.missing_ranges {
                if !fits_width(range.delta, self.missing_delta_width) {
                    return Err(ProtocolError::InvalidInput(
                        "missing range delta exceeds its wire width",
                    ));
                }
                cursor.write_uint_le(self.missing_delta_width, range.delta)?;
                cursor.write_u8(range.length)?;
            }
            cursor.write_u8(self.revived.len() as u8)?;
            for seq in &self.revived {
                if !fits_width(*seq, self.largest_observed_width) {
                    return Err(ProtocolError::InvalidInput(
                        "revived packet exceeds its wire width",
                    ));
                }
                cursor.write_uint_le(self.largest_observed_width, *seq)?;
            }
        }
        Ok(size)
    }
}
