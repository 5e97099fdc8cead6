// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Packet assembler and demultiplexer.
//!
//! Ties the header codecs, the frame codec and the AEAD layer together:
//!
//! ```text
//! datagram = public header ‖ AEAD(private header ‖ body)
//!            with aad = public header bytes, seq = header seqnum
//! ```
//!
//! Public reset and version negotiation packets are the two unprotected
//! forms: the former must survive the loss of all crypto state, the
//! latter precedes any negotiation.
//!
//! Authentication failures and malformed packets are reported to the
//! caller for dropping; per policy they are logged at debug level only
//! (an off-path attacker must not be able to fill the logs).

use super::frame::Frame;
use super::private_header::PrivateHeader;
use super::public_header::PublicHeader;
use super::public_reset::PublicResetPacket;
use super::{
    fec::FecPacket, ConnectionId, ProtocolError, ProtocolResult, Version, FLAG_PUBLIC_RESET,
    FLAG_VERSION, MASK_RESERVED,
};
use crate::crypto::Aead;
use log::debug;

/// Conservative UDP payload bound: 1500 MTU minus IP + UDP headers.
pub const MAX_PACKET_SIZE: usize = 1472;

/// Payload variants a packet can carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacketPayload {
    PublicReset(PublicResetPacket),
    VersionNegotiation(Vec<Version>),
    Fec(FecPacket),
    Frames(Vec<Frame>),
}

/// A complete packet: headers plus payload.
///
/// The private header is meaningful only for FEC and framed packets; the
/// unprotected forms ignore it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    public_header: PublicHeader,
    private_header: PrivateHeader,
    payload: PacketPayload,
}

impl Packet {
    /// Public reset for `conn_id`, echoing the peer's nonce proof.
    pub fn public_reset(
        conn_id: ConnectionId,
        nonce_proof: u64,
        rejected_seq_num: u64,
    ) -> Packet {
        let mut public_header = PublicHeader::new();
        public_header.set_public_reset_flag(true);
        public_header.set_connection_id(conn_id);
        Packet {
            public_header,
            private_header: PrivateHeader::new(),
            payload: PacketPayload::PublicReset(PublicResetPacket::new(
                nonce_proof,
                rejected_seq_num,
            )),
        }
    }

    /// Version negotiation listing the versions this endpoint speaks.
    pub fn version_negotiation(conn_id: ConnectionId, versions: Vec<Version>) -> Packet {
        let mut public_header = PublicHeader::new();
        public_header.set_version_flag(true);
        public_header.set_connection_id(conn_id);
        Packet {
            public_header,
            private_header: PrivateHeader::new(),
            payload: PacketPayload::VersionNegotiation(versions),
        }
    }

    /// FEC redundancy packet closing a group.
    pub fn fec(
        public_header: PublicHeader,
        mut private_header: PrivateHeader,
        fec: FecPacket,
    ) -> Packet {
        private_header.set_fec_packet_flag(true);
        private_header.set_fec_group_flag(true);
        private_header.set_fec_group_offset(fec.offset());
        Packet { public_header, private_header, payload: PacketPayload::Fec(fec) }
    }

    /// Regular framed packet.
    pub fn framed(
        public_header: PublicHeader,
        private_header: PrivateHeader,
        frames: Vec<Frame>,
    ) -> Packet {
        Packet { public_header, private_header, payload: PacketPayload::Frames(frames) }
    }

    pub fn public_header(&self) -> &PublicHeader {
        &self.public_header
    }

    pub fn public_header_mut(&mut self) -> &mut PublicHeader {
        &mut self.public_header
    }

    pub fn private_header(&self) -> &PrivateHeader {
        &self.private_header
    }

    pub fn payload(&self) -> &PacketPayload {
        &self.payload
    }

    /// Parse an unprotected packet (public reset, or a FEC/framed packet
    /// whose payload is already plaintext).
    pub fn parse_plaintext(data: &[u8]) -> ProtocolResult<Packet> {
        let (public_header, header_len) = PublicHeader::parse(data)?;
        if public_header.public_reset_flag() {
            let (reset, consumed) = PublicResetPacket::parse(&data[header_len..])?;
            if header_len + consumed != data.len() {
                return Err(ProtocolError::InvalidInput("trailing bytes after public reset"));
            }
            return Ok(Packet {
                public_header,
                private_header: PrivateHeader::new(),
                payload: PacketPayload::PublicReset(reset),
            });
        }
        let (private_header, payload) =
            Self::parse_protected_payload(&public_header, &data[header_len..])?;
        Ok(Packet { public_header, private_header, payload })
    }

    /// Demultiplex the decrypted region: private header, then FEC
    /// redundancy or a frame sequence.
    fn parse_protected_payload(
        public_header: &PublicHeader,
        plaintext: &[u8],
    ) -> ProtocolResult<(PrivateHeader, PacketPayload)> {
        let (private_header, header_len) = PrivateHeader::parse(plaintext)?;
        let body = &plaintext[header_len..];
        if private_header.fec_packet_flag() {
            let mut fec = FecPacket::new();
            fec.setup(public_header.sequence_number(), private_header.fec_group_offset()?);
            fec.parse(body)?;
            Ok((private_header, PacketPayload::Fec(fec)))
        } else {
            let frames = Frame::parse_sequence(body, public_header.sequence_number_width())?;
            Ok((private_header, PacketPayload::Frames(frames)))
        }
    }

    /// Parse a version negotiation packet: flags, connection ID, then a
    /// bare list of 32-bit versions. Invoked explicitly by the session
    /// layer, which knows the peer's version was not acceptable.
    pub fn parse_version_negotiation(data: &[u8]) -> ProtocolResult<Packet> {
        if data.len() < 2 {
            return Err(ProtocolError::ShortInput("version negotiation needs 2 bytes minimum"));
        }
        let pf = data[0];
        if pf & MASK_RESERVED != 0 {
            return Err(ProtocolError::InvalidInput("public flags reserved bits set"));
        }
        if pf & FLAG_PUBLIC_RESET != 0 || pf & FLAG_VERSION == 0 {
            return Err(ProtocolError::InvalidInput("not a version negotiation packet"));
        }
        let (public_header, header_len) = {
            // Reuse the regular parser for flags + connection ID by
            // treating the remainder separately.
            let conn_id_width = match (pf >> 2) & 0x3 {
                0 => 0,
                1 => 1,
                2 => 4,
                _ => 8,
            };
            let mut header = PublicHeader::new();
            header.set_version_flag(true);
            header.set_connection_id_width(conn_id_width)?;
            let mut cursor = crate::core::ser::Cursor::new(&data[1..]);
            header.set_connection_id(cursor.read_uint_le(conn_id_width)?);
            (header, 1 + conn_id_width)
        };
        let list = &data[header_len..];
        if list.is_empty() || list.len() % 4 != 0 {
            return Err(ProtocolError::InvalidInput("version list must be a multiple of 4 bytes"));
        }
        let versions = list
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(Packet {
            public_header,
            private_header: PrivateHeader::new(),
            payload: PacketPayload::VersionNegotiation(versions),
        })
    }

    fn protected_payload_size(&self) -> usize {
        match &self.payload {
            PacketPayload::Fec(fec) => self.private_header.serialized_size() + fec.serialized_size(),
            PacketPayload::Frames(frames) => {
                let width = self.public_header.sequence_number_width();
                self.private_header.serialized_size()
                    + frames.iter().map(|f| f.serialized_size(width)).sum::<usize>()
            }
            _ => 0,
        }
    }

    /// Size of the fully serialized plaintext packet.
    pub fn serialized_size(&self) -> usize {
        match &self.payload {
            PacketPayload::PublicReset(reset) => 9 + reset.serialized_size(),
            PacketPayload::VersionNegotiation(versions) => {
                1 + self.public_header.connection_id_width() + 4 * versions.len()
            }
            _ => self.public_header.serialized_size() + self.protected_payload_size(),
        }
    }

    /// Serialize the private header plus body (the AEAD plaintext).
    fn serialize_protected_payload(&self, out: &mut [u8]) -> ProtocolResult<usize> {
        let mut offset = self.private_header.serialize(out)?;
        match &self.payload {
            PacketPayload::Fec(fec) => {
                if !self.private_header.fec_packet_flag() {
                    return Err(ProtocolError::InvalidInput(
                        "FEC payload without FEC packet flag",
                    ));
                }
                offset += fec.serialize(&mut out[offset..])?;
            }
            PacketPayload::Frames(frames) => {
                if self.private_header.fec_packet_flag() {
                    return Err(ProtocolError::InvalidInput(
                        "framed payload with FEC packet flag",
                    ));
                }
                offset += Frame::serialize_sequence(
                    frames,
                    &mut out[offset..],
                    self.public_header.sequence_number_width(),
                )?;
            }
            _ => unreachable!("unprotected payloads serialize elsewhere"),
        }
        Ok(offset)
    }

    /// Serialize without AEAD protection, returning the byte count.
    pub fn serialize_plaintext(&self, out: &mut [u8]) -> ProtocolResult<usize> {
        match &self.payload {
            PacketPayload::PublicReset(reset) => {
                let header_len = self.public_header.serialize(out)?;
                let body_len = reset.serialize(&mut out[header_len..])?;
                Ok(header_len + body_len)
            }
            PacketPayload::VersionNegotiation(versions) => {
                let size = self.serialized_size();
                if out.len() < size {
                    return Err(ProtocolError::BufferTooSmall("version negotiation packet"));
                }
                let width = self.public_header.connection_id_width();
                let width_code: u8 = match width {
                    0 => 0,
                    1 => 1,
                    4 => 2,
                    _ => 3,
                };
                out[0] = FLAG_VERSION | (width_code << 2);
                let mut cursor = crate::core::ser::CursorMut::new(&mut out[1..size]);
                cursor.write_uint_le(width, self.public_header.connection_id())?;
                for version in versions {
                    cursor.write_u32_le(*version)?;
                }
                Ok(size)
            }
            _ => {
                let header_len = self.public_header.serialize(out)?;
                let payload_len = self.serialize_protected_payload(&mut out[header_len..])?;
                Ok(header_len + payload_len)
            }
        }
    }

    /// Serialize and AEAD-protect a FEC or framed packet into `out`.
    ///
    /// The AAD is the public header exactly as written; the sequence
    /// number comes from the public header.
    pub fn seal(&self, aead: &Aead, out: &mut [u8]) -> ProtocolResult<usize> {
        match &self.payload {
            PacketPayload::PublicReset(_) | PacketPayload::VersionNegotiation(_) => {
                Err(ProtocolError::InvalidInput("packet type is never AEAD-protected"))
            }
            _ => {
                let header_len = self.public_header.serialize(out)?;
                let mut plaintext = vec![0u8; self.protected_payload_size()];
                let plaintext_len = self.serialize_protected_payload(&mut plaintext)?;
                let (aad, rest) = out.split_at_mut(header_len);
                let sealed = aead.seal(
                    self.public_header.sequence_number(),
                    rest,
                    aad,
                    &plaintext[..plaintext_len],
                )?;
                Ok(header_len + sealed)
            }
        }
    }

    /// Parse and AEAD-open a received datagram.
    ///
    /// Public resets short-circuit (they carry no protection). Everything
    /// else is opened with the public header as AAD, then demultiplexed
    /// into a FEC or framed payload.
    pub fn open(aead: &Aead, data: &[u8]) -> ProtocolResult<Packet> {
        let (public_header, header_len) = PublicHeader::parse(data)?;
        if public_header.public_reset_flag() {
            let (reset, consumed) = PublicResetPacket::parse(&data[header_len..])?;
            if header_len + consumed != data.len() {
                return Err(ProtocolError::InvalidInput("trailing bytes after public reset"));
            }
            return Ok(Packet {
                public_header,
                private_header: PrivateHeader::new(),
                payload: PacketPayload::PublicReset(reset),
            });
        }

        let ciphertext = &data[header_len..];
        let mut plaintext = vec![0u8; ciphertext.len()];
        let plaintext_len = aead
            .open(
                public_header.sequence_number(),
                &mut plaintext,
                &data[..header_len],
                ciphertext,
            )
            .map_err(|err| {
                debug!(
                    "dropping packet seq={} conn={:#x}: {}",
                    public_header.sequence_number(),
                    public_header.connection_id(),
                    err
                );
                err
            })?;

        let (private_header, payload) =
            Self::parse_protected_payload(&public_header, &plaintext[..plaintext_len])?;
        Ok(Packet { public_header, private_header, payload })
    }
}
