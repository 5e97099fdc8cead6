// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Public reset packet body.
//!
//! A public reset aborts a connection without valid cryptographic state
//! (e.g. after a server restart), so it is never AEAD-protected. The body
//! is a `PRST` tag-value map carrying exactly two 8-byte entries:
//! `RNON` (nonce proof) and `RSEQ` (the rejected sequence number).

use super::{ProtocolError, ProtocolResult, SequenceNumber};
use crate::handshake::tags::{TAG_PRST, TAG_RNON, TAG_RSEQ};
use crate::handshake::Message;

/// Nonce proof plus rejected sequence number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublicResetPacket {
    nonce_proof: u64,
    rejected_seq_num: SequenceNumber,
}

impl PublicResetPacket {
    pub fn new(nonce_proof: u64, rejected_seq_num: SequenceNumber) -> Self {
        PublicResetPacket { nonce_proof, rejected_seq_num }
    }

    /// Parse the PRST body, returning the packet and consumed byte count.
    pub fn parse(data: &[u8]) -> ProtocolResult<(PublicResetPacket, usize)> {
        let (message, consumed) = Message::parse(data)?;
        if !message.is_message_tag(TAG_PRST) {
            return Err(ProtocolError::InvalidInput("public reset body is not a PRST message"));
        }
        let nonce = message
            .contains_tag(TAG_RNON)
            .ok_or(ProtocolError::InvalidInput("public reset without RNON"))?;
        let rseq = message
            .contains_tag(TAG_RSEQ)
            .ok_or(ProtocolError::InvalidInput("public reset without RSEQ"))?;
        if nonce.len() != 8 {
            return Err(ProtocolError::InvalidInput("RNON value must be 8 bytes"));
        }
        if rseq.len() != 8 {
            return Err(ProtocolError::InvalidInput("RSEQ value must be 8 bytes"));
        }
        Ok((
            PublicResetPacket {
                nonce_proof: u64::from_le_bytes(nonce.try_into().expect("8-byte slice")),
                rejected_seq_num: u64::from_le_bytes(rseq.try_into().expect("8-byte slice")),
            },
            consumed,
        ))
    }

    fn to_message(self) -> Message {
        let mut message = Message::new(TAG_PRST).expect("PRST is a known discriminator");
        message
            .add_tag_value(TAG_RNON, &self.nonce_proof.to_le_bytes())
            .expect("fresh tag");
        message
            .add_tag_value(TAG_RSEQ, &self.rejected_seq_num.to_le_bytes())
            .expect("fresh tag");
        message
    }

    pub fn serialized_size(&self) -> usize {
        // PRST header + two index entries + two 8-byte values.
        8 + 2 * 8 + 16
    }

    pub fn serialize(&self, out: &mut [u8]) -> ProtocolResult<usize> {
        Ok(self.to_message().serialize(out)?)
    }

    pub fn nonce_proof(&self) -> u64 {
        self.nonce_proof
    }

    pub fn set_nonce_proof(&mut self, nonce_proof: u64) {
        self.nonce_proof = nonce_proof;
    }

    pub fn rejected_seq_num(&self) -> SequenceNumber {
        self.rejected_seq_num
    }

    pub fn set_rejected_seq_num(&mut self, seq_num: SequenceNumber) {
        self.rejected_seq_num = seq_num;
    }
}
