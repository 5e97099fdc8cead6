// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! FEC redundancy payload.
//!
//! A FEC group is a contiguous run of sequenced packets closed by one
//! redundancy packet whose payload is the XOR of the group members'
//! plaintext payloads, padded to the group MTU. Losing any single packet
//! of the group is recoverable without retransmission by XORing the
//! survivors against the redundancy block.
//!
//! The redundancy payload carries no framing of its own: everything after
//! the private header is redundancy bytes.

use super::{FecGroupOffset, ProtocolError, ProtocolResult, SequenceNumber};

/// FEC packet body plus group bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FecPacket {
    /// Sequence number of the first packet of the group.
    group_first_seq_num: SequenceNumber,
    /// Distance of this packet from the first packet of the group.
    offset: FecGroupOffset,
    redundancy: Vec<u8>,
}

impl FecPacket {
    pub fn new() -> Self {
        FecPacket::default()
    }

    /// Bind this FEC packet to its group: `seq_num` is this packet's own
    /// sequence number, `offset` the FEC-group offset from the private
    /// header.
    pub fn setup(&mut self, seq_num: SequenceNumber, offset: FecGroupOffset) {
        self.group_first_seq_num = seq_num - SequenceNumber::from(offset);
        self.offset = offset;
    }

    /// Parse the redundancy body: all remaining packet bytes.
    pub fn parse(&mut self, data: &[u8]) -> ProtocolResult<usize> {
        if data.is_empty() {
            return Err(ProtocolError::ShortInput("FEC packet without redundancy bytes"));
        }
        self.redundancy = data.to_vec();
        Ok(data.len())
    }

    pub fn serialized_size(&self) -> usize {
        self.redundancy.len()
    }

    pub fn serialize(&self, out: &mut [u8]) -> ProtocolResult<usize> {
        if out.len() < self.redundancy.len() {
            return Err(ProtocolError::BufferTooSmall("FEC redundancy"));
        }
        out[..self.redundancy.len()].copy_from_slice(&self.redundancy);
        Ok(self.redundancy.len())
    }

    /// XOR a group member's payload into the redundancy block, growing the
    /// block to the longest member seen (shorter members are implicitly
    /// zero-padded to the group MTU).
    pub fn fold_member(&mut self, payload: &[u8]) {
        if payload.len() > self.redundancy.len() {
            self.redundancy.resize(payload.len(), 0);
        }
        for (r, b) in self.redundancy.iter_mut().zip(payload) {
            *r ^= b;
        }
    }

    pub fn group_first_seq_num(&self) -> SequenceNumber {
        self.group_first_seq_num
    }

    pub fn offset(&self) -> FecGroupOffset {
        self.offset
    }

    pub fn redundancy(&self) -> &[u8] {
        &self.redundancy
    }

    pub fn set_redundancy(&mut self, redundancy: Vec<u8>) {
        self.redundancy = redundancy;
    }
}
