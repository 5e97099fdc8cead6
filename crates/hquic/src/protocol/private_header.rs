// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Private header codec.
//!
//! ```text
//!      0       1
//! +--------+--------+
//! |Private | FEC (8)|
//! |Flags(8)|  (opt) |
//! +--------+--------+
//!
//! Private flags:
//! +---+---+---+---+---+---+---+---+
//! | 0 | 0 | 0 | 0 | 0 |FEC|GRP|ENT|
//! +---+---+---+---+---+---+---+---+
//! ```
//!
//! The FEC group offset byte is present iff GRP is set. A FEC packet is
//! necessarily part of a FEC group, so FEC implies GRP.

use super::{
    FecGroupOffset, ProtocolError, ProtocolResult, FLAG_ENTROPY, FLAG_FEC_GROUP, FLAG_FEC_PACKET,
    MASK_PRIVATE_RESERVED,
};

/// Private header: entropy bit, FEC flags, optional FEC group offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrivateHeader {
    fec_packet_flag: bool,
    fec_group_flag: bool,
    entropy_flag: bool,
    fec_group_offset: FecGroupOffset,
}

impl PrivateHeader {
    pub fn new() -> Self {
        PrivateHeader::default()
    }

    /// Parse a private header, returning the header and consumed byte count.
    pub fn parse(data: &[u8]) -> ProtocolResult<(PrivateHeader, usize)> {
        if data.is_empty() {
            return Err(ProtocolError::ShortInput("private header needs 1 byte minimum"));
        }
        let pf = data[0];
        if pf & MASK_PRIVATE_RESERVED != 0 {
            return Err(ProtocolError::InvalidInput("private flags reserved bits set"));
        }
        let mut header = PrivateHeader {
            fec_packet_flag: pf & FLAG_FEC_PACKET != 0,
            fec_group_flag: pf & FLAG_FEC_GROUP != 0,
            entropy_flag: pf & FLAG_ENTROPY != 0,
            fec_group_offset: 0,
        };
        if header.fec_packet_flag && !header.fec_group_flag {
            return Err(ProtocolError::InvalidInput("FEC packet flag without FEC group flag"));
        }
        if header.fec_group_flag {
            if data.len() < 2 {
                return Err(ProtocolError::ShortInput("missing FEC group offset byte"));
            }
            header.fec_group_offset = data[1];
            return Ok((header, 2));
        }
        Ok((header, 1))
    }

    pub fn serialized_size(&self) -> usize {
        if self.fec_group_flag {
            2
        } else {
            1
        }
    }

    /// Serialize into `out`, returning the written byte count.
    pub fn serialize(&self, out: &mut [u8]) -> ProtocolResult<usize> {
        if self.fec_packet_flag && !self.fec_group_flag {
            return Err(ProtocolError::InvalidInput("FEC packet flag without FEC group flag"));
        }
        let size = self.serialized_size();
        if out.len() < size {
            return Err(ProtocolError::BufferTooSmall("private header"));
        }
        let mut pf = 0u8;
        if self.fec_packet_flag {
            pf |= FLAG_FEC_PACKET;
        }
        if self.fec_group_flag {
            pf |= FLAG_FEC_GROUP;
        }
        if self.entropy_flag {
            pf |= FLAG_ENTROPY;
        }
        out[0] = pf;
        if self.fec_group_flag {
            out[1] = self.fec_group_offset;
        }
        Ok(size)
    }

    pub fn fec_packet_flag(&self) -> bool {
        self.fec_packet_flag
    }

    pub fn set_fec_packet_flag(&mut self, state: bool) {
        self.fec_packet_flag = state;
    }

    pub fn fec_group_flag(&self) -> bool {
        self.fec_group_flag
    }

    pub fn set_fec_group_flag(&mut self, state: bool) {
        self.fec_group_flag = state;
    }

    pub fn entropy_flag(&self) -> bool {
        self.entropy_flag
    }

    pub fn set_entropy_flag(&mut self, state: bool) {
        self.entropy_flag = state;
    }

    /// FEC group offset; an error if this header carries no FEC group.
    pub fn fec_group_offset(&self) -> ProtocolResult<FecGroupOffset> {
        if !self.fec_group_flag {
            return Err(ProtocolError::InvalidInput("no FEC group in private header"));
        }
        Ok(self.fec_group_offset)
    }

    pub fn set_fec_group_offset(&mut self, offset: FecGroupOffset) {
        self.fec_group_offset = offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PrivateVector {
        valid: bool,
        data: &'static [u8],
        fec_packet: bool,
        fec_group: bool,
        entropy: bool,
        offset: FecGroupOffset,
    }

    const VECTORS: &[PrivateVector] = &[
        // Invalid data size or flag combinations
        PrivateVector { valid: false, data: &[], fec_packet: false, fec_group: false, entropy: false, offset: 0 },
        PrivateVector { valid: false, data: &[0xf0], fec_packet: false, fec_group: false, entropy: false, offset: 0 },
        PrivateVector { valid: false, data: &[0x07], fec_packet: true, fec_group: true, entropy: true, offset: 0 },
        PrivateVector { valid: false, data: &[0x05], fec_packet: true, fec_group: false, entropy: true, offset: 0 },
        PrivateVector { valid: false, data: &[0x04], fec_packet: true, fec_group: false, entropy: false, offset: 0 },
        // FEC packet flag set
        PrivateVector { valid: true, data: &[0x06, 0x42], fec_packet: true, fec_group: true, entropy: false, offset: 0x42 },
        PrivateVector { valid: true, data: &[0x07, 0x42], fec_packet: true, fec_group: true, entropy: true, offset: 0x42 },
        // FEC packet flag unset
        PrivateVector { valid: true, data: &[0x03, 0x42], fec_packet: false, fec_group: true, entropy: true, offset: 0x42 },
        PrivateVector { valid: true, data: &[0x02, 0x42], fec_packet: false, fec_group: true, entropy: false, offset: 0x42 },
        PrivateVector { valid: true, data: &[0x01], fec_packet: false, fec_group: false, entropy: true, offset: 0 },
        PrivateVector { valid: true, data: &[0x00], fec_packet: false, fec_group: false, entropy: false, offset: 0 },
    ];

    #[test]
    fn test_parse_vectors() {
        for (i, v) in VECTORS.iter().enumerate() {
            match PrivateHeader::parse(v.data) {
                Ok((header, consumed)) => {
                    assert!(v.valid, "vector {}: expected parse failure", i);
                    assert_eq!(consumed, v.data.len(), "vector {}: consumed", i);
                    assert_eq!(header.fec_packet_flag(), v.fec_packet, "vector {}", i);
                    assert_eq!(header.fec_group_flag(), v.fec_group, "vector {}", i);
                    assert_eq!(header.entropy_flag(), v.entropy, "vector {}", i);
                    if v.fec_group {
                        assert_eq!(
                            header.fec_group_offset().expect("offset present"),
                            v.offset,
                            "vector {}",
                            i
                        );
                    } else {
                        assert!(header.fec_group_offset().is_err(), "vector {}", i);
                    }
                }
                Err(_) => assert!(!v.valid, "vector {}: unexpected parse failure", i),
            }
        }
    }

    #[test]
    fn test_serialize_vectors_byte_exact() {
        let mut buf = [0u8; 2];
        for (i, v) in VECTORS.iter().enumerate().filter(|(_, v)| v.valid) {
            let mut header = PrivateHeader::new();
            header.set_fec_packet_flag(v.fec_packet);
            header.set_fec_group_flag(v.fec_group);
            header.set_entropy_flag(v.entropy);
            header.set_fec_group_offset(v.offset);
            let written = header.serialize(&mut buf).expect("serialize should succeed");
            assert_eq!(&buf[..written], v.data, "vector {}: bytes", i);
        }
    }

    #[test]
    fn test_serialize_rejects_fec_packet_without_group() {
        let mut header = PrivateHeader::new();
        header.set_fec_packet_flag(true);
        let mut buf = [0u8; 2];
        assert!(matches!(
            header.serialize(&mut buf).unwrap_err(),
            ProtocolError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_serialize_buffer_too_small() {
        let mut header = PrivateHeader::new();
        header.set_fec_group_flag(true);
        let mut buf = [0u8; 1];
        assert!(matches!(
            header.serialize(&mut buf).unwrap_err(),
            ProtocolError::BufferTooSmall(_)
        ));
    }
}
